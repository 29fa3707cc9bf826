// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoded instructions, one struct per encoding format.
//!
//! Field names follow the hardware encoding. Register fields hold register numbers; operand
//! fields that accept several kinds of source use [`Operand`].

use core::fmt;

use si_isa::{
    Category, DsOp, Format, MimgOp, MtbufOp, MubufOp, Opcode, SmrdOp, Sop1Op, Sop2Op, SopcOp,
    SopkOp, SoppOp, VintrpOp, Vop1Op, Vop2Op, Vop3Op, VopcOp, sreg,
};

use crate::stats::InstructionKind;

/// A source operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    /// An index into the scalar operand space: SGPRs, hardware registers and inline constants.
    Sreg(u32),
    /// A vector register of the executing lane.
    Vreg(u32),
    /// A 32-bit literal encoded after the instruction word.
    Literal(u32),
}

impl Operand {
    /// The inline constant `0`.
    pub const ZERO: Self = Self::Sreg(sreg::INLINE_INT_FIRST);

    /// Encodes an integer, using an inline constant when one exists.
    #[must_use]
    pub const fn int(value: i32) -> Self {
        match value {
            0..=64 => Self::Sreg(sreg::INLINE_INT_FIRST + value as u32),
            -16..=-1 => Self::Sreg((sreg::INLINE_INT_POSITIVE_LAST as i32 - value) as u32),
            _ => Self::Literal(value as u32),
        }
    }

    /// Returns `true` for a literal operand.
    #[must_use]
    #[inline]
    pub const fn is_literal(self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Vreg(r) => write!(f, "v{r}"),
            Self::Literal(v) => write!(f, "{v:#x}"),
            Self::Sreg(index) => match index {
                sreg::VCC_LO => f.write_str("vcc_lo"),
                sreg::VCC_HI => f.write_str("vcc_hi"),
                sreg::M0 => f.write_str("m0"),
                sreg::EXEC_LO => f.write_str("exec_lo"),
                sreg::EXEC_HI => f.write_str("exec_hi"),
                sreg::VCCZ => f.write_str("vccz"),
                sreg::EXECZ => f.write_str("execz"),
                sreg::SCC => f.write_str("scc"),
                sreg::INLINE_INT_FIRST..=sreg::INLINE_INT_LAST => {
                    let value = sreg::inline_constant(index).unwrap_or(0);
                    write!(f, "{}", value.cast_signed())
                }
                sreg::INLINE_FLOAT_FIRST..=sreg::INLINE_FLOAT_LAST => {
                    let value = sreg::INLINE_FLOATS[(index - sreg::INLINE_FLOAT_FIRST) as usize];
                    write!(f, "{value:?}")
                }
                _ => write!(f, "s{index}"),
            },
        }
    }
}

/// Scalar ALU, two inputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sop2 {
    /// Opcode.
    pub op: Sop2Op,
    /// Destination register (first of a pair for 64-bit ops).
    pub sdst: u32,
    /// First source.
    pub ssrc0: Operand,
    /// Second source.
    pub ssrc1: Operand,
}

/// Scalar ALU with a 16-bit inline constant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sopk {
    /// Opcode.
    pub op: SopkOp,
    /// Destination (and for some ops, source) register.
    pub sdst: u32,
    /// Immediate.
    pub simm16: u16,
}

/// Scalar ALU, one input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sop1 {
    /// Opcode.
    pub op: Sop1Op,
    /// Destination register (first of a pair for 64-bit ops).
    pub sdst: u32,
    /// Source.
    pub ssrc0: Operand,
}

/// Scalar compare writing SCC.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sopc {
    /// Opcode.
    pub op: SopcOp,
    /// First source.
    pub ssrc0: Operand,
    /// Second source.
    pub ssrc1: Operand,
}

/// Scalar program control.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sopp {
    /// Opcode.
    pub op: SoppOp,
    /// Immediate; a signed dword offset for branches.
    pub simm16: u16,
}

/// Offset of a scalar memory read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SmrdOffset {
    /// Offset in dwords.
    Imm(u8),
    /// SGPR holding a byte offset.
    Sgpr(u32),
}

/// Scalar memory read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Smrd {
    /// Opcode.
    pub op: SmrdOp,
    /// First destination register.
    pub sdst: u32,
    /// First register of the 64-bit address (or 128-bit buffer descriptor).
    pub sbase: u32,
    /// Offset from the base.
    pub offset: SmrdOffset,
}

/// Vector ALU, two inputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Vop2 {
    /// Opcode.
    pub op: Vop2Op,
    /// Destination vector register.
    pub vdst: u32,
    /// First source.
    pub src0: Operand,
    /// Second source, always a vector register.
    pub vsrc1: u32,
}

/// Vector ALU, one input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Vop1 {
    /// Opcode.
    pub op: Vop1Op,
    /// Destination register; an SGPR for `v_readfirstlane_b32`.
    pub vdst: u32,
    /// Source.
    pub src0: Operand,
}

/// Vector compare writing the lane's VCC bit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Vopc {
    /// Opcode.
    pub op: VopcOp,
    /// First source.
    pub src0: Operand,
    /// Second source, always a vector register.
    pub vsrc1: u32,
}

/// Vector ALU, three inputs with modifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Vop3a {
    /// Opcode.
    pub op: Vop3Op,
    /// Destination vector register; the first SGPR of the result mask for compares.
    pub vdst: u32,
    /// Sources. `v_cndmask_b32` takes its lane mask from the SGPR pair in `src[2]`.
    pub src: [Operand; 3],
    /// Per-source absolute value bits (floating point only).
    pub abs: u8,
    /// Per-source negation bits (floating point only).
    pub neg: u8,
    /// Clamp floating point results to `[0, 1]`.
    pub clamp: bool,
    /// Output modifier: 0 none, 1 multiply by 2, 2 multiply by 4, 3 divide by 2.
    pub omod: u8,
}

impl Vop3a {
    /// Creates an instruction without modifiers.
    #[must_use]
    pub const fn new(op: Vop3Op, vdst: u32, src: [Operand; 3]) -> Self {
        Self {
            op,
            vdst,
            src,
            abs: 0,
            neg: 0,
            clamp: false,
            omod: 0,
        }
    }
}

/// Vector ALU, three inputs with an explicit scalar carry destination.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Vop3b {
    /// Opcode.
    pub op: Vop3Op,
    /// Destination vector register.
    pub vdst: u32,
    /// First SGPR of the carry-out mask.
    pub sdst: u32,
    /// Sources. `v_addc_u32` takes its carry-in mask from the SGPR pair in `src[2]`.
    pub src: [Operand; 3],
}

/// Parameter interpolation reading attribute data from LDS at M0.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Vintrp {
    /// Opcode.
    pub op: VintrpOp,
    /// Destination vector register.
    pub vdst: u32,
    /// Barycentric coordinate register; for `v_interp_mov_f32`, the parameter selector.
    pub vsrc: u32,
    /// Attribute number.
    pub attr: u8,
    /// Attribute channel.
    pub chan: u8,
}

/// Local data share access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ds {
    /// Opcode.
    pub op: DsOp,
    /// Destination vector register for reads.
    pub vdst: u32,
    /// Register holding the byte address.
    pub addr: u32,
    /// First data register for writes.
    pub data0: u32,
    /// Second data register for two-address writes.
    pub data1: u32,
    /// Low offset byte, or the first dword offset of two-address ops.
    pub offset0: u8,
    /// High offset byte, or the second dword offset of two-address ops.
    pub offset1: u8,
}

/// Untyped buffer access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mubuf {
    /// Opcode.
    pub op: MubufOp,
    /// First data register.
    pub vdata: u32,
    /// Offset and/or index register.
    pub vaddr: u32,
    /// First SGPR of the buffer descriptor.
    pub srsrc: u32,
    /// Scalar byte offset.
    pub soffset: Operand,
    /// Immediate byte offset.
    pub offset: u16,
    /// `vaddr` (or `vaddr + 1` with `idxen`) holds a byte offset.
    pub offen: bool,
    /// `vaddr` holds a record index scaled by the descriptor stride.
    pub idxen: bool,
    /// Atomics return the pre-operation value.
    pub glc: bool,
}

impl Mubuf {
    /// Creates an access with no offsets or indexing.
    #[must_use]
    pub const fn new(op: MubufOp, vdata: u32, vaddr: u32, srsrc: u32) -> Self {
        Self {
            op,
            vdata,
            vaddr,
            srsrc,
            soffset: Operand::ZERO,
            offset: 0,
            offen: false,
            idxen: false,
            glc: false,
        }
    }
}

/// Typed buffer access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mtbuf {
    /// Opcode.
    pub op: MtbufOp,
    /// First data register.
    pub vdata: u32,
    /// Offset and/or index register.
    pub vaddr: u32,
    /// First SGPR of the buffer descriptor.
    pub srsrc: u32,
    /// Scalar byte offset.
    pub soffset: Operand,
    /// Immediate byte offset.
    pub offset: u16,
    /// `vaddr` (or `vaddr + 1` with `idxen`) holds a byte offset.
    pub offen: bool,
    /// `vaddr` holds a record index scaled by the descriptor stride.
    pub idxen: bool,
}

/// Image access over a linear one-dimensional image of dwords.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mimg {
    /// Opcode.
    pub op: MimgOp,
    /// Data register.
    pub vdata: u32,
    /// Register holding the x coordinate.
    pub vaddr: u32,
    /// First SGPR of the image descriptor.
    pub srsrc: u32,
}

/// Export of up to four components per lane.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Exp {
    /// Export target.
    pub target: u8,
    /// Component enable mask.
    pub en: u8,
    /// Source register per component.
    pub vsrc: [u32; 4],
    /// Last export of the program.
    pub done: bool,
}

/// How an instruction maps onto the lanes of a wavefront.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum LanePolicy {
    /// Once, ignoring the active mask.
    Scalar,
    /// Once per active lane.
    ActiveLanes,
    /// Once, on the lowest active lane (lane 0 if none is active).
    FirstActiveLane,
}

/// A decoded instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `SOP2`.
    Sop2(Sop2),
    /// `SOPK`.
    Sopk(Sopk),
    /// `SOP1`.
    Sop1(Sop1),
    /// `SOPC`.
    Sopc(Sopc),
    /// `SOPP`.
    Sopp(Sopp),
    /// `SMRD`.
    Smrd(Smrd),
    /// `VOP2`.
    Vop2(Vop2),
    /// `VOP1`.
    Vop1(Vop1),
    /// `VOPC`.
    Vopc(Vopc),
    /// `VOP3a`.
    Vop3a(Vop3a),
    /// `VOP3b`.
    Vop3b(Vop3b),
    /// `VINTRP`.
    Vintrp(Vintrp),
    /// `DS`.
    Ds(Ds),
    /// `MUBUF`.
    Mubuf(Mubuf),
    /// `MTBUF`.
    Mtbuf(Mtbuf),
    /// `MIMG`.
    Mimg(Mimg),
    /// `EXP`.
    Exp(Exp),
}

impl Instruction {
    /// Encoding format.
    #[must_use]
    pub fn format(&self) -> Format {
        match self {
            Self::Sop2(_) => Format::Sop2,
            Self::Sopk(_) => Format::Sopk,
            Self::Sop1(_) => Format::Sop1,
            Self::Sopc(_) => Format::Sopc,
            Self::Sopp(_) => Format::Sopp,
            Self::Smrd(_) => Format::Smrd,
            Self::Vop2(_) => Format::Vop2,
            Self::Vop1(_) => Format::Vop1,
            Self::Vopc(_) => Format::Vopc,
            Self::Vop3a(_) => Format::Vop3a,
            Self::Vop3b(_) => Format::Vop3b,
            Self::Vintrp(_) => Format::Vintrp,
            Self::Ds(_) => Format::Ds,
            Self::Mubuf(_) => Format::Mubuf,
            Self::Mtbuf(_) => Format::Mtbuf,
            Self::Mimg(_) => Format::Mimg,
            Self::Exp(_) => Format::Exp,
        }
    }

    /// Opcode.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Sop2(i) => i.op.into(),
            Self::Sopk(i) => i.op.into(),
            Self::Sop1(i) => i.op.into(),
            Self::Sopc(i) => i.op.into(),
            Self::Sopp(i) => i.op.into(),
            Self::Smrd(i) => i.op.into(),
            Self::Vop2(i) => i.op.into(),
            Self::Vop1(i) => i.op.into(),
            Self::Vopc(i) => i.op.into(),
            Self::Vop3a(i) => i.op.into(),
            Self::Vop3b(i) => i.op.into(),
            Self::Vintrp(i) => i.op.into(),
            Self::Ds(i) => i.op.into(),
            Self::Mubuf(i) => i.op.into(),
            Self::Mtbuf(i) => i.op.into(),
            Self::Mimg(i) => i.op.into(),
            Self::Exp(_) => Opcode::Exp,
        }
    }

    /// Assembler mnemonic.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        self.opcode().mnemonic()
    }

    /// Returns `true` if a 32-bit literal follows the instruction word.
    #[must_use]
    pub fn has_literal(&self) -> bool {
        match self {
            Self::Sop2(i) => i.ssrc0.is_literal() || i.ssrc1.is_literal(),
            Self::Sop1(i) => i.ssrc0.is_literal(),
            Self::Sopc(i) => i.ssrc0.is_literal() || i.ssrc1.is_literal(),
            Self::Vop2(i) => i.src0.is_literal(),
            Self::Vop1(i) => i.src0.is_literal(),
            Self::Vopc(i) => i.src0.is_literal(),
            _ => false,
        }
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn size(&self) -> u32 {
        let base = self.format().base_size();
        if self.has_literal() { base + 4 } else { base }
    }

    /// Statistics bucket.
    #[must_use]
    pub fn kind(&self) -> InstructionKind {
        match self {
            Self::Sopp(i) if i.op.is_branch() => InstructionKind::Branch,
            Self::Smrd(_) => InstructionKind::ScalarMemory,
            Self::Ds(_) => InstructionKind::Lds,
            Self::Exp(_) => InstructionKind::Export,
            Self::Mubuf(_) | Self::Mtbuf(_) | Self::Mimg(_) => InstructionKind::VectorMemory,
            _ => match self.format().category() {
                Category::Scalar => InstructionKind::ScalarAlu,
                Category::VectorAlu | Category::VectorMemory => InstructionKind::VectorAlu,
            },
        }
    }

    pub(crate) fn policy(&self) -> LanePolicy {
        match self.format().category() {
            Category::Scalar => LanePolicy::Scalar,
            Category::VectorAlu | Category::VectorMemory => match self {
                Self::Vop1(Vop1 {
                    op: Vop1Op::VReadfirstlaneB32,
                    ..
                }) => LanePolicy::FirstActiveLane,
                _ => LanePolicy::ActiveLanes,
            },
        }
    }
}

macro_rules! instruction_from {
    ($($format:ident,)*) => {
        $(
            impl From<$format> for Instruction {
                #[inline]
                fn from(inst: $format) -> Self {
                    Self::$format(inst)
                }
            }
        )*
    };
}

instruction_from! {
    Sop2, Sopk, Sop1, Sopc, Sopp, Smrd, Vop2, Vop1, Vopc, Vop3a, Vop3b, Vintrp, Ds, Mubuf, Mtbuf,
    Mimg, Exp,
}

fn sreg_pair(index: u32) -> SregPair {
    SregPair(index)
}

struct SregPair(u32);

impl fmt::Display for SregPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            sreg::VCC_LO => f.write_str("vcc"),
            sreg::EXEC_LO => f.write_str("exec"),
            i => write!(f, "s[{}:{}]", i, i + 1),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mnemonic();
        match self {
            Self::Sop2(i) => {
                let wide = matches!(
                    i.op,
                    Sop2Op::SAndB64 | Sop2Op::SOrB64 | Sop2Op::SXorB64 | Sop2Op::SAndn2B64
                );
                if wide {
                    write!(f, "{m} {}, {}, {}", sreg_pair(i.sdst), i.ssrc0, i.ssrc1)
                } else {
                    write!(f, "{m} s{}, {}, {}", i.sdst, i.ssrc0, i.ssrc1)
                }
            }
            Self::Sopk(i) => write!(f, "{m} s{}, {:#x}", i.sdst, i.simm16),
            Self::Sop1(i) => match i.op {
                Sop1Op::SMovB32 | Sop1Op::SNotB32 => write!(f, "{m} s{}, {}", i.sdst, i.ssrc0),
                _ => write!(f, "{m} {}, {}", sreg_pair(i.sdst), i.ssrc0),
            },
            Self::Sopc(i) => write!(f, "{m} {}, {}", i.ssrc0, i.ssrc1),
            Self::Sopp(i) => match i.op {
                SoppOp::SNop | SoppOp::SEndpgm | SoppOp::SBarrier => f.write_str(m),
                _ => write!(f, "{m} {}", i.simm16.cast_signed()),
            },
            Self::Smrd(i) => {
                write!(f, "{m} s{}, {}, ", i.sdst, sreg_pair(i.sbase))?;
                match i.offset {
                    SmrdOffset::Imm(dw) => write!(f, "{dw:#x}"),
                    SmrdOffset::Sgpr(s) => write!(f, "s{s}"),
                }
            }
            Self::Vop2(i) => match i.op {
                Vop2Op::VCndmaskB32 => write!(f, "{m} v{}, {}, v{}, vcc", i.vdst, i.src0, i.vsrc1),
                Vop2Op::VAddI32 | Vop2Op::VSubI32 | Vop2Op::VSubrevI32 => {
                    write!(f, "{m} v{}, vcc, {}, v{}", i.vdst, i.src0, i.vsrc1)
                }
                _ => write!(f, "{m} v{}, {}, v{}", i.vdst, i.src0, i.vsrc1),
            },
            Self::Vop1(i) => match i.op {
                Vop1Op::VNop => f.write_str(m),
                Vop1Op::VReadfirstlaneB32 => write!(f, "{m} s{}, {}", i.vdst, i.src0),
                _ => write!(f, "{m} v{}, {}", i.vdst, i.src0),
            },
            Self::Vopc(i) => write!(f, "{m} vcc, {}, v{}", i.src0, i.vsrc1),
            Self::Vop3a(i) => {
                let [a, b, c] = i.src;
                if i.op.compare().is_some() {
                    write!(f, "{m} {}, {a}, {b}", sreg_pair(i.vdst))
                } else {
                    write!(f, "{m} v{}, {a}, {b}, {c}", i.vdst)
                }
            }
            Self::Vop3b(i) => {
                let [a, b, c] = i.src;
                write!(f, "{m} v{}, {}, {a}, {b}", i.vdst, sreg_pair(i.sdst))?;
                if i.op == Vop3Op::VAddcU32 {
                    write!(f, ", {c}")?;
                }
                Ok(())
            }
            Self::Vintrp(i) => write!(
                f,
                "{m} v{}, v{}, attr{}.{}",
                i.vdst,
                i.vsrc,
                i.attr,
                ['x', 'y', 'z', 'w'][usize::from(i.chan & 3)]
            ),
            Self::Ds(i) => write!(
                f,
                "{m} v{}, v{}, v{}, v{} offset0:{} offset1:{}",
                i.vdst, i.addr, i.data0, i.data1, i.offset0, i.offset1
            ),
            Self::Mubuf(i) => write!(
                f,
                "{m} v{}, v{}, s[{}:{}], {} offset:{}{}{}",
                i.vdata,
                i.vaddr,
                i.srsrc,
                i.srsrc + 3,
                i.soffset,
                i.offset,
                if i.offen { " offen" } else { "" },
                if i.idxen { " idxen" } else { "" }
            ),
            Self::Mtbuf(i) => write!(
                f,
                "{m} v{}, v{}, s[{}:{}], {} offset:{}",
                i.vdata,
                i.vaddr,
                i.srsrc,
                i.srsrc + 3,
                i.soffset,
                i.offset
            ),
            Self::Mimg(i) => write!(
                f,
                "{m} v{}, v{}, s[{}:{}]",
                i.vdata,
                i.vaddr,
                i.srsrc,
                i.srsrc + 7
            ),
            Self::Exp(i) => {
                let [x, y, z, w] = i.vsrc;
                write!(
                    f,
                    "{m} {} v{x}, v{y}, v{z}, v{w} en:{:#x}{}",
                    i.target,
                    i.en,
                    if i.done { " done" } else { "" }
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn sizes_account_for_literals() {
        let add = Instruction::from(Sop2 {
            op: Sop2Op::SAddU32,
            sdst: 0,
            ssrc0: Operand::Sreg(1),
            ssrc1: Operand::int(4),
        });
        assert_eq!(add.size(), 4);
        let add_lit = Instruction::from(Sop2 {
            ssrc1: Operand::int(1000),
            ..match add {
                Instruction::Sop2(i) => i,
                _ => unreachable!(),
            }
        });
        assert_eq!(add_lit.size(), 8);
        let ds = Instruction::from(Ds {
            op: DsOp::DsReadB32,
            vdst: 0,
            addr: 1,
            data0: 0,
            data1: 0,
            offset0: 0,
            offset1: 0,
        });
        assert_eq!(ds.size(), 8);
    }

    #[test]
    fn inline_integers_pick_constants() {
        assert_eq!(Operand::int(0), Operand::Sreg(128));
        assert_eq!(Operand::int(64), Operand::Sreg(192));
        assert_eq!(Operand::int(-1), Operand::Sreg(193));
        assert_eq!(Operand::int(-16), Operand::Sreg(208));
        assert_eq!(Operand::int(65), Operand::Literal(65));
        assert_eq!(Operand::int(-17), Operand::Literal((-17_i32) as u32));
    }

    #[test]
    fn readfirstlane_uses_first_active_policy() {
        let rfl = Instruction::from(Vop1 {
            op: Vop1Op::VReadfirstlaneB32,
            vdst: 3,
            src0: Operand::Vreg(0),
        });
        assert_eq!(rfl.policy(), LanePolicy::FirstActiveLane);
        assert_eq!(rfl.to_string(), "v_readfirstlane_b32 s3, v0");
        let mov = Instruction::from(Vop1 {
            op: Vop1Op::VMovB32,
            vdst: 3,
            src0: Operand::int(-2),
        });
        assert_eq!(mov.policy(), LanePolicy::ActiveLanes);
        assert_eq!(mov.to_string(), "v_mov_b32 v3, -2");
        let ds = Instruction::from(Ds {
            op: DsOp::DsWriteB32,
            vdst: 0,
            addr: 0,
            data0: 1,
            data1: 0,
            offset0: 0,
            offset1: 0,
        });
        assert_eq!(ds.policy(), LanePolicy::ActiveLanes);
    }

    #[test]
    fn kinds_follow_format() {
        let branch = Instruction::from(Sopp {
            op: SoppOp::SBranch,
            simm16: 0,
        });
        let end = Instruction::from(Sopp {
            op: SoppOp::SEndpgm,
            simm16: 0,
        });
        assert_eq!(branch.kind(), InstructionKind::Branch);
        assert_eq!(end.kind(), InstructionKind::ScalarAlu);
        let intrp = Instruction::from(Vintrp {
            op: VintrpOp::VInterpP1F32,
            vdst: 0,
            vsrc: 0,
            attr: 0,
            chan: 0,
        });
        assert_eq!(intrp.kind(), InstructionKind::VectorAlu);
    }
}
