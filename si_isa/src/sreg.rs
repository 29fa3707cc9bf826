// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Special indices of the 256-entry scalar operand space.
//!
//! Scalar source operands share one 8-bit index space between general-purpose SGPRs, hardware
//! registers (VCC, M0, EXEC), status bits and inline constants.

/// Number of general-purpose scalar registers (`s0..=s103`).
pub const SGPR_COUNT: u32 = 104;

/// Size of the scalar operand index space.
pub const SPACE_SIZE: usize = 256;

/// Low half of the vector condition code.
pub const VCC_LO: u32 = 106;
/// High half of the vector condition code.
pub const VCC_HI: u32 = 107;
/// Memory descriptor register, used for LDS addressing and interpolation.
pub const M0: u32 = 124;
/// Active mask for lanes 0..32.
pub const EXEC_LO: u32 = 126;
/// Active mask for lanes 32..64.
pub const EXEC_HI: u32 = 127;

/// First inline integer constant (`0`).
pub const INLINE_INT_FIRST: u32 = 128;
/// Index of the inline integer constant `64`.
pub const INLINE_INT_POSITIVE_LAST: u32 = 192;
/// Last inline integer constant (`-16`).
pub const INLINE_INT_LAST: u32 = 208;

/// First inline float constant (`0.5`).
pub const INLINE_FLOAT_FIRST: u32 = 240;
/// Last inline float constant (`-4.0`).
pub const INLINE_FLOAT_LAST: u32 = 247;

/// Inline float constants in index order starting at [`INLINE_FLOAT_FIRST`].
pub const INLINE_FLOATS: [f32; 8] = [0.5, -0.5, 1.0, -1.0, 2.0, -2.0, 4.0, -4.0];

/// `1` when VCC is zero.
pub const VCCZ: u32 = 251;
/// `1` when EXEC is zero.
pub const EXECZ: u32 = 252;
/// Scalar condition code.
pub const SCC: u32 = 253;
/// Operand is a 32-bit literal following the instruction word.
pub const LITERAL: u32 = 255;

/// Returns `true` for indices that do not name a register or constant.
#[must_use]
pub const fn is_reserved(index: u32) -> bool {
    matches!(index, 104 | 105 | 125 | 209..=239 | 248..=250 | 254) || index >= 256
}

/// Returns the value of an inline constant index, or `None` for non-constant indices.
#[must_use]
pub const fn inline_constant(index: u32) -> Option<u32> {
    match index {
        INLINE_INT_FIRST..=INLINE_INT_POSITIVE_LAST => Some(index - INLINE_INT_FIRST),
        193..=INLINE_INT_LAST => Some((INLINE_INT_POSITIVE_LAST as i32 - index as i32) as u32),
        INLINE_FLOAT_FIRST..=INLINE_FLOAT_LAST => {
            Some(INLINE_FLOATS[(index - INLINE_FLOAT_FIRST) as usize].to_bits())
        }
        _ => None,
    }
}
