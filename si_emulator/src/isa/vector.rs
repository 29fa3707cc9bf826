// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use si_isa::{Format, VintrpOp, Vop1Op, Vop2Op, Vop3Op, VopcOp, sreg};

use super::{Lane, unimplemented};
use crate::error::EmulatorError;
use crate::instruction::{Instruction, Vintrp, Vop1, Vop2, Vop3a, Vop3b, Vopc};
use crate::memory::Memory;

fn f(bits: u32) -> f32 {
    f32::from_bits(bits)
}

fn compare(op: VopcOp, a: u32, b: u32) -> bool {
    let (sa, sb) = (a.cast_signed(), b.cast_signed());
    match op {
        VopcOp::VCmpLtF32 => f(a) < f(b),
        VopcOp::VCmpEqF32 => f(a) == f(b),
        VopcOp::VCmpGtF32 => f(a) > f(b),
        VopcOp::VCmpLtI32 => sa < sb,
        VopcOp::VCmpEqI32 => sa == sb,
        VopcOp::VCmpLeI32 => sa <= sb,
        VopcOp::VCmpGtI32 => sa > sb,
        VopcOp::VCmpNeI32 => sa != sb,
        VopcOp::VCmpGeI32 => sa >= sb,
        VopcOp::VCmpLtU32 => a < b,
        VopcOp::VCmpEqU32 => a == b,
        VopcOp::VCmpLeU32 => a <= b,
        VopcOp::VCmpGtU32 => a > b,
        VopcOp::VCmpNeU32 => a != b,
        VopcOp::VCmpGeU32 => a >= b,
    }
}

pub(super) fn vop2(i: &Vop2, inst: &Instruction, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let a = lane.src(i.src0, inst)?;
    let b = lane.vreg(i.vsrc1)?;
    let (sa, sb) = (a.cast_signed(), b.cast_signed());
    let r = match i.op {
        Vop2Op::VCndmaskB32 => {
            if lane.mask_bit(sreg::VCC_LO)? {
                b
            } else {
                a
            }
        }
        Vop2Op::VAddF32 => (f(a) + f(b)).to_bits(),
        Vop2Op::VSubF32 => (f(a) - f(b)).to_bits(),
        Vop2Op::VMulF32 => (f(a) * f(b)).to_bits(),
        Vop2Op::VMinI32 => sa.min(sb).cast_unsigned(),
        Vop2Op::VMaxI32 => sa.max(sb).cast_unsigned(),
        Vop2Op::VMinU32 => a.min(b),
        Vop2Op::VMaxU32 => a.max(b),
        Vop2Op::VLshrrevB32 => b >> (a & 31),
        Vop2Op::VAshrrevI32 => (sb >> (a & 31)).cast_unsigned(),
        Vop2Op::VLshlrevB32 => b << (a & 31),
        Vop2Op::VAndB32 => a & b,
        Vop2Op::VOrB32 => a | b,
        Vop2Op::VXorB32 => a ^ b,
        Vop2Op::VAddI32 => {
            let (r, carry) = a.overflowing_add(b);
            lane.set_mask_bit(sreg::VCC_LO, carry)?;
            r
        }
        Vop2Op::VSubI32 => {
            let (r, borrow) = a.overflowing_sub(b);
            lane.set_mask_bit(sreg::VCC_LO, borrow)?;
            r
        }
        Vop2Op::VSubrevI32 => {
            let (r, borrow) = b.overflowing_sub(a);
            lane.set_mask_bit(sreg::VCC_LO, borrow)?;
            r
        }
    };
    lane.set_vreg(i.vdst, r)
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "float to integer conversion saturates, which is the instruction's definition"
)]
pub(super) fn vop1(i: &Vop1, inst: &Instruction, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    if i.op == Vop1Op::VNop {
        return Ok(());
    }
    let a = lane.src(i.src0, inst)?;
    let r = match i.op {
        Vop1Op::VReadfirstlaneB32 => return lane.sregs.write(i.vdst, a),
        Vop1Op::VMovB32 => a,
        Vop1Op::VCvtF32I32 => (a.cast_signed() as f32).to_bits(),
        Vop1Op::VCvtF32U32 => (a as f32).to_bits(),
        Vop1Op::VCvtU32F32 => f(a) as u32,
        Vop1Op::VCvtI32F32 => (f(a) as i32).cast_unsigned(),
        Vop1Op::VRcpF32 => (1.0 / f(a)).to_bits(),
        Vop1Op::VNotB32 => !a,
        Vop1Op::VNop | Vop1Op::VSqrtF32 => {
            return Err(unimplemented(Format::Vop1, i.op.mnemonic()));
        }
    };
    lane.set_vreg(i.vdst, r)
}

pub(super) fn vopc(i: &Vopc, inst: &Instruction, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let a = lane.src(i.src0, inst)?;
    let b = lane.vreg(i.vsrc1)?;
    lane.set_mask_bit(sreg::VCC_LO, compare(i.op, a, b))
}

/// Applies the per-source `abs` and `neg` modifiers to a float operand.
fn float_input(i: &Vop3a, index: usize, bits: u32) -> u32 {
    let mut bits = bits;
    if i.abs & (1 << index) != 0 {
        bits &= 0x7FFF_FFFF;
    }
    if i.neg & (1 << index) != 0 {
        bits ^= 0x8000_0000;
    }
    bits
}

/// Applies the output modifier and clamp to a float result.
fn float_output(i: &Vop3a, value: f32) -> u32 {
    let value = match i.omod {
        1 => value * 2.0,
        2 => value * 4.0,
        3 => value * 0.5,
        _ => value,
    };
    let value = if i.clamp { value.clamp(0.0, 1.0) } else { value };
    value.to_bits()
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "fused multiply-add rounds the exact f64 product-sum to f32 once"
)]
fn fma(a: f32, b: f32, c: f32) -> f32 {
    (f64::from(a) * f64::from(b) + f64::from(c)) as f32
}

fn bitfield_extract_u32(value: u32, offset: u32, width: u32) -> u32 {
    let width = width & 31;
    if width == 0 {
        return 0;
    }
    (value >> (offset & 31)) & ((1_u32 << width) - 1)
}

fn bitfield_extract_i32(value: u32, offset: u32, width: u32) -> u32 {
    let width = width & 31;
    let field = bitfield_extract_u32(value, offset, width);
    if width == 0 || field & (1 << (width - 1)) == 0 {
        field
    } else {
        field | !((1_u32 << width) - 1)
    }
}

pub(super) fn vop3a(
    i: &Vop3a,
    inst: &Instruction,
    lane: &mut Lane<'_>,
) -> Result<(), EmulatorError> {
    let [s0, s1, s2] = i.src;
    if let Some(cmp) = i.op.compare() {
        let mut a = lane.src(s0, inst)?;
        let mut b = lane.src(s1, inst)?;
        if matches!(
            cmp,
            VopcOp::VCmpLtF32 | VopcOp::VCmpEqF32 | VopcOp::VCmpGtF32
        ) {
            a = float_input(i, 0, a);
            b = float_input(i, 1, b);
        }
        return lane.set_mask_bit(i.vdst, compare(cmp, a, b));
    }

    let a = lane.src(s0, inst)?;
    let b = lane.src(s1, inst)?;
    let fa = || f(float_input(i, 0, a));
    let fb = || f(float_input(i, 1, b));
    let r = match i.op {
        Vop3Op::VCndmaskB32 => {
            if lane.mask_operand_bit(s2, inst)? {
                b
            } else {
                a
            }
        }
        Vop3Op::VAddF32 => float_output(i, fa() + fb()),
        Vop3Op::VMulF32 => float_output(i, fa() * fb()),
        Vop3Op::VMadF32 => {
            let c = f(float_input(i, 2, lane.src(s2, inst)?));
            float_output(i, fa() * fb() + c)
        }
        Vop3Op::VFmaF32 => {
            let c = f(float_input(i, 2, lane.src(s2, inst)?));
            float_output(i, fma(fa(), fb(), c))
        }
        Vop3Op::VMadU32U24 => {
            let c = lane.src(s2, inst)?;
            (a & 0x00FF_FFFF)
                .wrapping_mul(b & 0x00FF_FFFF)
                .wrapping_add(c)
        }
        Vop3Op::VBfeU32 => bitfield_extract_u32(a, b, lane.src(s2, inst)?),
        Vop3Op::VBfeI32 => bitfield_extract_i32(a, b, lane.src(s2, inst)?),
        Vop3Op::VBfiB32 => {
            let c = lane.src(s2, inst)?;
            (a & b) | (!a & c)
        }
        Vop3Op::VMulLoU32 => a.wrapping_mul(b),
        Vop3Op::VMulHiU32 => crate::register::split(u64::from(a) * u64::from(b)).1,
        Vop3Op::VMulLoI32 => a.cast_signed().wrapping_mul(b.cast_signed()).cast_unsigned(),
        _ => return Err(unimplemented(Format::Vop3a, i.op.mnemonic())),
    };
    lane.set_vreg(i.vdst, r)
}

pub(super) fn vop3b(
    i: &Vop3b,
    inst: &Instruction,
    lane: &mut Lane<'_>,
) -> Result<(), EmulatorError> {
    let [s0, s1, s2] = i.src;
    let a = lane.src(s0, inst)?;
    let b = lane.src(s1, inst)?;
    let (r, carry) = match i.op {
        Vop3Op::VAddI32 => a.overflowing_add(b),
        Vop3Op::VSubI32 => a.overflowing_sub(b),
        Vop3Op::VAddcU32 => {
            let carry_in = u64::from(lane.mask_operand_bit(s2, inst)?);
            let sum = u64::from(a) + u64::from(b) + carry_in;
            let (lo, hi) = crate::register::split(sum);
            (lo, hi != 0)
        }
        _ => return Err(unimplemented(Format::Vop3b, i.op.mnemonic())),
    };
    lane.set_vreg(i.vdst, r)?;
    lane.set_mask_bit(i.sdst, carry)
}

/// Attribute data in LDS: per attribute, four channels of three dwords (`P0`, `P10`, `P20`).
const ATTRIBUTE_STRIDE: u64 = 48;
const CHANNEL_STRIDE: u64 = 12;

pub(super) fn vintrp(i: &Vintrp, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let base = u64::from(lane.sregs.m0())
        + u64::from(i.attr) * ATTRIBUTE_STRIDE
        + u64::from(i.chan) * CHANNEL_STRIDE;
    let p0 = f(lane.lds.read_u32(base)?);
    let p10 = f(lane.lds.read_u32(base + 4)?);
    let p20 = f(lane.lds.read_u32(base + 8)?);
    let r = match i.op {
        VintrpOp::VInterpP1F32 => p10 * f(lane.vreg(i.vsrc)?) + p0,
        VintrpOp::VInterpP2F32 => p20 * f(lane.vreg(i.vsrc)?) + f(lane.vreg(i.vdst)?),
        VintrpOp::VInterpMovF32 => match i.vsrc {
            0 => p10,
            1 => p20,
            2 => p0,
            _ => return Err(unimplemented(Format::Vintrp, i.op.mnemonic())),
        },
    };
    lane.set_vreg(i.vdst, r.to_bits())
}
