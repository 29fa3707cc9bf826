// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-format opcode tables.
//!
//! Each table lists the opcodes the toolchain knows about, keyed by their hardware opcode number
//! within the format. Knowing an opcode does not imply the emulator implements it; unimplemented
//! opcodes are reported by the emulator when executed.

use core::fmt;

use crate::format::Format;

macro_rules! opcode_table {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $code:literal => $mnemonic:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`", $mnemonic, "`")]
                $variant,
            )*
        }

        impl $name {
            /// Hardware opcode number within the format.
            #[must_use]
            pub const fn code(self) -> u16 {
                match self {
                    $(Self::$variant => $code,)*
                }
            }

            /// Looks up an opcode by its hardware number.
            #[must_use]
            pub const fn from_code(code: u16) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// Assembler mnemonic.
            #[must_use]
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(Self::$variant => $mnemonic,)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.mnemonic())
            }
        }
    };
}

opcode_table! {
    /// `SOP2` opcodes.
    Sop2Op {
        SAddU32 = 0 => "s_add_u32",
        SSubU32 = 1 => "s_sub_u32",
        SAddI32 = 2 => "s_add_i32",
        SSubI32 = 3 => "s_sub_i32",
        SMinI32 = 6 => "s_min_i32",
        SMinU32 = 7 => "s_min_u32",
        SMaxI32 = 8 => "s_max_i32",
        SMaxU32 = 9 => "s_max_u32",
        SCselectB32 = 10 => "s_cselect_b32",
        SAndB32 = 14 => "s_and_b32",
        SAndB64 = 15 => "s_and_b64",
        SOrB32 = 16 => "s_or_b32",
        SOrB64 = 17 => "s_or_b64",
        SXorB32 = 18 => "s_xor_b32",
        SXorB64 = 19 => "s_xor_b64",
        SAndn2B64 = 21 => "s_andn2_b64",
        SLshlB32 = 30 => "s_lshl_b32",
        SLshrB32 = 32 => "s_lshr_b32",
        SAshrI32 = 34 => "s_ashr_i32",
        SMulI32 = 38 => "s_mul_i32",
    }
}

opcode_table! {
    /// `SOPK` opcodes.
    SopkOp {
        SMovkI32 = 0 => "s_movk_i32",
        SCmpkLeU32 = 14 => "s_cmpk_le_u32",
        SAddkI32 = 15 => "s_addk_i32",
        SMulkI32 = 16 => "s_mulk_i32",
    }
}

opcode_table! {
    /// `SOP1` opcodes.
    Sop1Op {
        SMovB32 = 3 => "s_mov_b32",
        SMovB64 = 4 => "s_mov_b64",
        SNotB32 = 7 => "s_not_b32",
        SWqmB64 = 10 => "s_wqm_b64",
        SSwappcB64 = 33 => "s_swappc_b64",
        SAndSaveexecB64 = 36 => "s_and_saveexec_b64",
        SOrSaveexecB64 = 37 => "s_or_saveexec_b64",
    }
}

opcode_table! {
    /// `SOPC` opcodes.
    SopcOp {
        SCmpEqI32 = 0 => "s_cmp_eq_i32",
        SCmpLgI32 = 1 => "s_cmp_lg_i32",
        SCmpGtI32 = 2 => "s_cmp_gt_i32",
        SCmpGeI32 = 3 => "s_cmp_ge_i32",
        SCmpLtI32 = 4 => "s_cmp_lt_i32",
        SCmpLeI32 = 5 => "s_cmp_le_i32",
        SCmpEqU32 = 6 => "s_cmp_eq_u32",
        SCmpLgU32 = 7 => "s_cmp_lg_u32",
        SCmpGtU32 = 8 => "s_cmp_gt_u32",
        SCmpGeU32 = 9 => "s_cmp_ge_u32",
        SCmpLtU32 = 10 => "s_cmp_lt_u32",
        SCmpLeU32 = 11 => "s_cmp_le_u32",
    }
}

opcode_table! {
    /// `SOPP` opcodes.
    SoppOp {
        SNop = 0 => "s_nop",
        SEndpgm = 1 => "s_endpgm",
        SBranch = 2 => "s_branch",
        SCbranchScc0 = 4 => "s_cbranch_scc0",
        SCbranchScc1 = 5 => "s_cbranch_scc1",
        SCbranchVccz = 6 => "s_cbranch_vccz",
        SCbranchVccnz = 7 => "s_cbranch_vccnz",
        SCbranchExecz = 8 => "s_cbranch_execz",
        SCbranchExecnz = 9 => "s_cbranch_execnz",
        SBarrier = 10 => "s_barrier",
        SWaitcnt = 12 => "s_waitcnt",
    }
}

impl SoppOp {
    /// Returns `true` for the jump family (`s_branch` and the conditional branches).
    #[must_use]
    #[inline]
    pub const fn is_branch(self) -> bool {
        let code = self.code();
        code > 1 && code < 10
    }
}

opcode_table! {
    /// `SMRD` opcodes.
    SmrdOp {
        SLoadDword = 0 => "s_load_dword",
        SLoadDwordx2 = 1 => "s_load_dwordx2",
        SLoadDwordx4 = 2 => "s_load_dwordx4",
        SBufferLoadDword = 8 => "s_buffer_load_dword",
        SBufferLoadDwordx2 = 9 => "s_buffer_load_dwordx2",
        SBufferLoadDwordx4 = 10 => "s_buffer_load_dwordx4",
    }
}

opcode_table! {
    /// `VOP2` opcodes.
    Vop2Op {
        VCndmaskB32 = 0 => "v_cndmask_b32",
        VAddF32 = 3 => "v_add_f32",
        VSubF32 = 4 => "v_sub_f32",
        VMulF32 = 8 => "v_mul_f32",
        VMinI32 = 17 => "v_min_i32",
        VMaxI32 = 18 => "v_max_i32",
        VMinU32 = 19 => "v_min_u32",
        VMaxU32 = 20 => "v_max_u32",
        VLshrrevB32 = 22 => "v_lshrrev_b32",
        VAshrrevI32 = 24 => "v_ashrrev_i32",
        VLshlrevB32 = 26 => "v_lshlrev_b32",
        VAndB32 = 27 => "v_and_b32",
        VOrB32 = 28 => "v_or_b32",
        VXorB32 = 29 => "v_xor_b32",
        VAddI32 = 37 => "v_add_i32",
        VSubI32 = 38 => "v_sub_i32",
        VSubrevI32 = 39 => "v_subrev_i32",
    }
}

opcode_table! {
    /// `VOP1` opcodes.
    Vop1Op {
        VNop = 0 => "v_nop",
        VMovB32 = 1 => "v_mov_b32",
        VReadfirstlaneB32 = 2 => "v_readfirstlane_b32",
        VCvtF32I32 = 5 => "v_cvt_f32_i32",
        VCvtF32U32 = 6 => "v_cvt_f32_u32",
        VCvtU32F32 = 7 => "v_cvt_u32_f32",
        VCvtI32F32 = 8 => "v_cvt_i32_f32",
        VRcpF32 = 42 => "v_rcp_f32",
        VSqrtF32 = 51 => "v_sqrt_f32",
        VNotB32 = 55 => "v_not_b32",
    }
}

opcode_table! {
    /// `VOPC` opcodes.
    VopcOp {
        VCmpLtF32 = 1 => "v_cmp_lt_f32",
        VCmpEqF32 = 2 => "v_cmp_eq_f32",
        VCmpGtF32 = 4 => "v_cmp_gt_f32",
        VCmpLtI32 = 129 => "v_cmp_lt_i32",
        VCmpEqI32 = 130 => "v_cmp_eq_i32",
        VCmpLeI32 = 131 => "v_cmp_le_i32",
        VCmpGtI32 = 132 => "v_cmp_gt_i32",
        VCmpNeI32 = 133 => "v_cmp_ne_i32",
        VCmpGeI32 = 134 => "v_cmp_ge_i32",
        VCmpLtU32 = 193 => "v_cmp_lt_u32",
        VCmpEqU32 = 194 => "v_cmp_eq_u32",
        VCmpLeU32 = 195 => "v_cmp_le_u32",
        VCmpGtU32 = 196 => "v_cmp_gt_u32",
        VCmpNeU32 = 197 => "v_cmp_ne_u32",
        VCmpGeU32 = 198 => "v_cmp_ge_u32",
    }
}

opcode_table! {
    /// `VOP3` opcodes (shared by the `VOP3a` and `VOP3b` encodings).
    ///
    /// Opcodes below 256 are the three-operand encodings of the `VOPC` compares.
    Vop3Op {
        VCmpLtF32 = 1 => "v_cmp_lt_f32",
        VCmpEqF32 = 2 => "v_cmp_eq_f32",
        VCmpGtF32 = 4 => "v_cmp_gt_f32",
        VCmpLtI32 = 129 => "v_cmp_lt_i32",
        VCmpEqI32 = 130 => "v_cmp_eq_i32",
        VCmpLeI32 = 131 => "v_cmp_le_i32",
        VCmpGtI32 = 132 => "v_cmp_gt_i32",
        VCmpNeI32 = 133 => "v_cmp_ne_i32",
        VCmpGeI32 = 134 => "v_cmp_ge_i32",
        VCmpLtU32 = 193 => "v_cmp_lt_u32",
        VCmpEqU32 = 194 => "v_cmp_eq_u32",
        VCmpLeU32 = 195 => "v_cmp_le_u32",
        VCmpGtU32 = 196 => "v_cmp_gt_u32",
        VCmpNeU32 = 197 => "v_cmp_ne_u32",
        VCmpGeU32 = 198 => "v_cmp_ge_u32",
        VCndmaskB32 = 256 => "v_cndmask_b32",
        VAddF32 = 259 => "v_add_f32",
        VMulF32 = 264 => "v_mul_f32",
        VAddI32 = 293 => "v_add_i32",
        VSubI32 = 294 => "v_sub_i32",
        VAddcU32 = 296 => "v_addc_u32",
        VMadF32 = 321 => "v_mad_f32",
        VMadU32U24 = 323 => "v_mad_u32_u24",
        VBfeU32 = 328 => "v_bfe_u32",
        VBfeI32 = 329 => "v_bfe_i32",
        VBfiB32 = 330 => "v_bfi_b32",
        VFmaF32 = 331 => "v_fma_f32",
        VMulLoU32 = 361 => "v_mul_lo_u32",
        VMulHiU32 = 362 => "v_mul_hi_u32",
        VMulLoI32 = 363 => "v_mul_lo_i32",
    }
}

impl Vop3Op {
    /// Returns the encoding this opcode uses.
    ///
    /// Carry-producing integer adds use `VOP3b`, which carries an explicit scalar destination.
    #[must_use]
    pub const fn format(self) -> Format {
        match self {
            Self::VAddI32 | Self::VSubI32 | Self::VAddcU32 => Format::Vop3b,
            _ => Format::Vop3a,
        }
    }

    /// Returns the compare this opcode encodes, if it is in the `VOPC` range.
    #[must_use]
    pub const fn compare(self) -> Option<VopcOp> {
        let code = self.code();
        if code < 256 {
            VopcOp::from_code(code)
        } else {
            None
        }
    }
}

opcode_table! {
    /// `VINTRP` opcodes.
    VintrpOp {
        VInterpP1F32 = 0 => "v_interp_p1_f32",
        VInterpP2F32 = 1 => "v_interp_p2_f32",
        VInterpMovF32 = 2 => "v_interp_mov_f32",
    }
}

opcode_table! {
    /// `DS` opcodes.
    DsOp {
        DsAddU32 = 0 => "ds_add_u32",
        DsWriteB32 = 13 => "ds_write_b32",
        DsWrite2B32 = 14 => "ds_write2_b32",
        DsWrite2st64B32 = 15 => "ds_write2st64_b32",
        DsWriteB8 = 30 => "ds_write_b8",
        DsWriteB16 = 31 => "ds_write_b16",
        DsReadB32 = 54 => "ds_read_b32",
        DsRead2B32 = 55 => "ds_read2_b32",
        DsRead2st64B32 = 56 => "ds_read2st64_b32",
        DsReadI8 = 57 => "ds_read_i8",
        DsReadU8 = 58 => "ds_read_u8",
        DsReadI16 = 59 => "ds_read_i16",
        DsReadU16 = 60 => "ds_read_u16",
        DsWriteB64 = 77 => "ds_write_b64",
        DsReadB64 = 118 => "ds_read_b64",
    }
}

opcode_table! {
    /// `MUBUF` opcodes.
    MubufOp {
        BufferLoadFormatX = 0 => "buffer_load_format_x",
        BufferStoreFormatX = 4 => "buffer_store_format_x",
        BufferLoadUbyte = 8 => "buffer_load_ubyte",
        BufferLoadSbyte = 9 => "buffer_load_sbyte",
        BufferLoadUshort = 10 => "buffer_load_ushort",
        BufferLoadSshort = 11 => "buffer_load_sshort",
        BufferLoadDword = 12 => "buffer_load_dword",
        BufferStoreByte = 24 => "buffer_store_byte",
        BufferStoreShort = 26 => "buffer_store_short",
        BufferStoreDword = 28 => "buffer_store_dword",
        BufferAtomicSwap = 48 => "buffer_atomic_swap",
        BufferAtomicAdd = 50 => "buffer_atomic_add",
    }
}

opcode_table! {
    /// `MTBUF` opcodes.
    MtbufOp {
        TbufferLoadFormatX = 0 => "tbuffer_load_format_x",
        TbufferLoadFormatXy = 1 => "tbuffer_load_format_xy",
        TbufferLoadFormatXyz = 2 => "tbuffer_load_format_xyz",
        TbufferLoadFormatXyzw = 3 => "tbuffer_load_format_xyzw",
        TbufferStoreFormatX = 4 => "tbuffer_store_format_x",
        TbufferStoreFormatXy = 5 => "tbuffer_store_format_xy",
        TbufferStoreFormatXyz = 6 => "tbuffer_store_format_xyz",
        TbufferStoreFormatXyzw = 7 => "tbuffer_store_format_xyzw",
    }
}

impl MtbufOp {
    /// Number of 32-bit components transferred per lane.
    #[must_use]
    pub const fn components(self) -> u32 {
        self.code() as u32 % 4 + 1
    }
}

opcode_table! {
    /// `MIMG` opcodes.
    MimgOp {
        ImageLoad = 0 => "image_load",
        ImageStore = 8 => "image_store",
        ImageSample = 32 => "image_sample",
    }
}

/// Any opcode the compiler or emulator can name, including the `PHI` pseudo-instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `SOP2` opcode.
    Sop2(Sop2Op),
    /// `SOPK` opcode.
    Sopk(SopkOp),
    /// `SOP1` opcode.
    Sop1(Sop1Op),
    /// `SOPC` opcode.
    Sopc(SopcOp),
    /// `SOPP` opcode.
    Sopp(SoppOp),
    /// `SMRD` opcode.
    Smrd(SmrdOp),
    /// `VOP2` opcode.
    Vop2(Vop2Op),
    /// `VOP1` opcode.
    Vop1(Vop1Op),
    /// `VOPC` opcode.
    Vopc(VopcOp),
    /// `VOP3a`/`VOP3b` opcode.
    Vop3(Vop3Op),
    /// `VINTRP` opcode.
    Vintrp(VintrpOp),
    /// `DS` opcode.
    Ds(DsOp),
    /// `MUBUF` opcode.
    Mubuf(MubufOp),
    /// `MTBUF` opcode.
    Mtbuf(MtbufOp),
    /// `MIMG` opcode.
    Mimg(MimgOp),
    /// `exp`.
    Exp,
    /// SSA merge pseudo-instruction emitted by the compiler front end; never encoded.
    Phi,
}

impl Opcode {
    /// Returns the encoding format, or `None` for pseudo-instructions.
    #[must_use]
    pub const fn format(self) -> Option<Format> {
        Some(match self {
            Self::Sop2(_) => Format::Sop2,
            Self::Sopk(_) => Format::Sopk,
            Self::Sop1(_) => Format::Sop1,
            Self::Sopc(_) => Format::Sopc,
            Self::Sopp(_) => Format::Sopp,
            Self::Smrd(_) => Format::Smrd,
            Self::Vop2(_) => Format::Vop2,
            Self::Vop1(_) => Format::Vop1,
            Self::Vopc(_) => Format::Vopc,
            Self::Vop3(op) => op.format(),
            Self::Vintrp(_) => Format::Vintrp,
            Self::Ds(_) => Format::Ds,
            Self::Mubuf(_) => Format::Mubuf,
            Self::Mtbuf(_) => Format::Mtbuf,
            Self::Mimg(_) => Format::Mimg,
            Self::Exp => Format::Exp,
            Self::Phi => return None,
        })
    }

    /// Assembler mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Sop2(op) => op.mnemonic(),
            Self::Sopk(op) => op.mnemonic(),
            Self::Sop1(op) => op.mnemonic(),
            Self::Sopc(op) => op.mnemonic(),
            Self::Sopp(op) => op.mnemonic(),
            Self::Smrd(op) => op.mnemonic(),
            Self::Vop2(op) => op.mnemonic(),
            Self::Vop1(op) => op.mnemonic(),
            Self::Vopc(op) => op.mnemonic(),
            Self::Vop3(op) => op.mnemonic(),
            Self::Vintrp(op) => op.mnemonic(),
            Self::Ds(op) => op.mnemonic(),
            Self::Mubuf(op) => op.mnemonic(),
            Self::Mtbuf(op) => op.mnemonic(),
            Self::Mimg(op) => op.mnemonic(),
            Self::Exp => "exp",
            Self::Phi => "phi",
        }
    }

    /// Returns `true` for the `PHI` pseudo-instruction.
    #[must_use]
    #[inline]
    pub const fn is_phi(self) -> bool {
        matches!(self, Self::Phi)
    }

    /// Returns `true` for plain register-to-register moves.
    ///
    /// The source and destination of a move may later share a physical register, so moves do
    /// not create interference.
    #[must_use]
    #[inline]
    pub const fn is_move(self) -> bool {
        matches!(
            self,
            Self::Sop1(Sop1Op::SMovB32 | Sop1Op::SMovB64) | Self::Vop1(Vop1Op::VMovB32)
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

macro_rules! opcode_from {
    ($($op:ident => $variant:ident,)*) => {
        $(
            impl From<$op> for Opcode {
                #[inline]
                fn from(op: $op) -> Self {
                    Self::$variant(op)
                }
            }
        )*
    };
}

opcode_from! {
    Sop2Op => Sop2,
    SopkOp => Sopk,
    Sop1Op => Sop1,
    SopcOp => Sopc,
    SoppOp => Sopp,
    SmrdOp => Smrd,
    Vop2Op => Vop2,
    Vop1Op => Vop1,
    VopcOp => Vopc,
    Vop3Op => Vop3,
    VintrpOp => Vintrp,
    DsOp => Ds,
    MubufOp => Mubuf,
    MtbufOp => Mtbuf,
    MimgOp => Mimg,
}
