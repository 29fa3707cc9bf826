// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instruction counters and per-instruction memory access classification.

use core::ops::{BitOr, BitOrAssign};

/// Statistics bucket of an executed instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    /// `s_branch` and the conditional branches.
    Branch,
    /// Any other scalar ALU or program-control instruction.
    ScalarAlu,
    /// Scalar memory read (`SMRD`).
    ScalarMemory,
    /// Vector ALU, including interpolation.
    VectorAlu,
    /// Buffer and image memory.
    VectorMemory,
    /// Local data share.
    Lds,
    /// Export.
    Export,
}

/// Instruction counts by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstructionCounters {
    /// All instructions.
    pub total: u64,
    /// Branches.
    pub branch: u64,
    /// Scalar ALU and program control.
    pub scalar_alu: u64,
    /// Scalar memory reads.
    pub scalar_memory: u64,
    /// Vector ALU.
    pub vector_alu: u64,
    /// Vector memory.
    pub vector_memory: u64,
    /// LDS.
    pub lds: u64,
    /// Exports.
    pub export: u64,
}

impl InstructionCounters {
    /// Counts one instruction of `kind`.
    pub fn record(&mut self, kind: InstructionKind) {
        self.total += 1;
        let bucket = match kind {
            InstructionKind::Branch => &mut self.branch,
            InstructionKind::ScalarAlu => &mut self.scalar_alu,
            InstructionKind::ScalarMemory => &mut self.scalar_memory,
            InstructionKind::VectorAlu => &mut self.vector_alu,
            InstructionKind::VectorMemory => &mut self.vector_memory,
            InstructionKind::Lds => &mut self.lds,
            InstructionKind::Export => &mut self.export,
        };
        *bucket += 1;
    }

    /// Adds every count of `other` into `self`.
    pub fn accumulate(&mut self, other: &Self) {
        self.total += other.total;
        self.branch += other.branch;
        self.scalar_alu += other.scalar_alu;
        self.scalar_memory += other.scalar_memory;
        self.vector_alu += other.vector_alu;
        self.vector_memory += other.vector_memory;
        self.lds += other.lds;
        self.export += other.export;
    }
}

/// Memory behavior of the most recently executed instruction.
///
/// A memory-timing model uses these to decide whether the wavefront must wait for a round trip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AccessFlags(u16);

impl AccessFlags {
    /// No memory behavior.
    pub const NONE: Self = Self(0);
    /// Buffer or image load.
    pub const VECTOR_MEM_READ: Self = Self(1 << 0);
    /// Buffer or image store.
    pub const VECTOR_MEM_WRITE: Self = Self(1 << 1);
    /// Buffer atomic.
    pub const VECTOR_MEM_ATOMIC: Self = Self(1 << 2);
    /// Scalar memory load.
    pub const SCALAR_MEM_READ: Self = Self(1 << 3);
    /// LDS load.
    pub const LDS_READ: Self = Self(1 << 4);
    /// LDS store.
    pub const LDS_WRITE: Self = Self(1 << 5);
    /// `s_waitcnt`: wait for outstanding memory operations.
    pub const MEM_WAIT: Self = Self(1 << 6);
    /// `s_barrier`.
    pub const BARRIER: Self = Self(1 << 7);

    /// Returns `true` if this set contains every flag in `other`.
    #[must_use]
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns `true` if no flag is set.
    #[must_use]
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AccessFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AccessFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
