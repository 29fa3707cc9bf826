// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Instruction encoding format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Scalar ALU, two inputs.
    Sop2,
    /// Scalar ALU, 16-bit inline constant.
    Sopk,
    /// Scalar ALU, one input.
    Sop1,
    /// Scalar compare.
    Sopc,
    /// Scalar program control.
    Sopp,
    /// Scalar memory read.
    Smrd,
    /// Vector ALU, two inputs.
    Vop2,
    /// Vector ALU, one input.
    Vop1,
    /// Vector compare.
    Vopc,
    /// Vector ALU, three inputs.
    Vop3a,
    /// Vector ALU, three inputs with a scalar carry destination.
    Vop3b,
    /// Vector parameter interpolation.
    Vintrp,
    /// Local data share.
    Ds,
    /// Untyped buffer memory.
    Mubuf,
    /// Typed buffer memory.
    Mtbuf,
    /// Image memory.
    Mimg,
    /// Export.
    Exp,
}

/// Lane-iteration policy family of a format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Executed once on the wavefront's scalar lane; the active mask is ignored.
    Scalar,
    /// Executed once per active lane.
    VectorAlu,
    /// Executed once per active lane and classified as a memory access.
    VectorMemory,
}

impl Format {
    /// Every format, in encoding-table order.
    pub const ALL: [Self; 17] = [
        Self::Sop2,
        Self::Sopk,
        Self::Sop1,
        Self::Sopc,
        Self::Sopp,
        Self::Smrd,
        Self::Vop2,
        Self::Vop1,
        Self::Vopc,
        Self::Vop3a,
        Self::Vop3b,
        Self::Vintrp,
        Self::Ds,
        Self::Mubuf,
        Self::Mtbuf,
        Self::Mimg,
        Self::Exp,
    ];

    /// Upper-case format name as used in the ISA manual.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sop2 => "SOP2",
            Self::Sopk => "SOPK",
            Self::Sop1 => "SOP1",
            Self::Sopc => "SOPC",
            Self::Sopp => "SOPP",
            Self::Smrd => "SMRD",
            Self::Vop2 => "VOP2",
            Self::Vop1 => "VOP1",
            Self::Vopc => "VOPC",
            Self::Vop3a => "VOP3a",
            Self::Vop3b => "VOP3b",
            Self::Vintrp => "VINTRP",
            Self::Ds => "DS",
            Self::Mubuf => "MUBUF",
            Self::Mtbuf => "MTBUF",
            Self::Mimg => "MIMG",
            Self::Exp => "EXP",
        }
    }

    /// Returns the lane-iteration family of this format.
    ///
    /// LDS (`DS`) instructions iterate like vector ALU instructions even though they access
    /// memory; their read/write classification is tracked separately.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Sop2 | Self::Sopk | Self::Sop1 | Self::Sopc | Self::Sopp | Self::Smrd => {
                Category::Scalar
            }
            Self::Vop2
            | Self::Vop1
            | Self::Vopc
            | Self::Vop3a
            | Self::Vop3b
            | Self::Vintrp
            | Self::Ds => Category::VectorAlu,
            Self::Mubuf | Self::Mtbuf | Self::Mimg | Self::Exp => Category::VectorMemory,
        }
    }

    /// Base encoded size in bytes, excluding a trailing 32-bit literal.
    #[must_use]
    pub const fn base_size(self) -> u32 {
        match self {
            Self::Sop2
            | Self::Sopk
            | Self::Sop1
            | Self::Sopc
            | Self::Sopp
            | Self::Smrd
            | Self::Vop2
            | Self::Vop1
            | Self::Vopc
            | Self::Vintrp => 4,
            Self::Vop3a
            | Self::Vop3b
            | Self::Ds
            | Self::Mubuf
            | Self::Mtbuf
            | Self::Mimg
            | Self::Exp => 8,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
