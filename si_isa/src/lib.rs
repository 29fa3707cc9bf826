// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Southern Islands instruction vocabulary shared by the compiler analyses and the emulator.
//!
//! This crate is intentionally data-only: it names the encoding formats, the opcodes of each
//! format (with their hardware opcode numbers and assembler mnemonics) and the special indices of
//! the scalar register space. Decoding raw instruction words is left to an external disassembler.

#![no_std]

mod format;
mod opcode;
pub mod sreg;

pub use format::{Category, Format};
pub use opcode::{
    DsOp, MimgOp, MtbufOp, MubufOp, Opcode, SmrdOp, Sop1Op, Sop2Op, SopcOp, SopkOp, SoppOp,
    VintrpOp, Vop1Op, Vop2Op, Vop3Op, VopcOp,
};

/// Register class of a general-purpose register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegClass {
    /// Vector general-purpose register (one value per lane).
    Vector,
    /// Scalar general-purpose register (one value per wavefront).
    Scalar,
}

impl RegClass {
    /// Assembler prefix used when printing registers of this class (`v` or `s`).
    #[must_use]
    #[inline]
    pub const fn prefix(self) -> char {
        match self {
            Self::Vector => 'v',
            Self::Scalar => 's',
        }
    }
}
