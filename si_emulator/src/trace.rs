// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Optional execution observer.
//!
//! The emulator consults [`TraceSink::mask`] once per run and only calls the hooks that are
//! enabled, so a sink that asks for nothing costs one branch per event site.

use crate::instruction::Instruction;
use crate::kernel::Kernel;

/// Events a sink wants to receive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceMask(u8);

impl TraceMask {
    /// No events.
    pub const NONE: Self = Self(0);
    /// Work-group scope enter/exit.
    pub const WORK_GROUP: Self = Self(1 << 0);
    /// Every executed instruction.
    pub const INSTRUCTION: Self = Self(1 << 1);

    /// Returns `true` if this mask contains every event in `other`.
    #[must_use]
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl core::ops::BitOr for TraceMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A traced scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// A work group, from dispatch until every wavefront finished.
    WorkGroup {
        /// Linear work-group id.
        id: u32,
    },
}

/// Receives execution events.
pub trait TraceSink {
    /// Events this sink wants.
    fn mask(&self) -> TraceMask;

    /// A scope begins.
    fn scope_enter(&mut self, _kernel: &Kernel, _kind: ScopeKind) {}

    /// The innermost scope of `kind` ends.
    fn scope_exit(&mut self, _kernel: &Kernel, _kind: ScopeKind) {}

    /// An instruction is about to execute.
    fn instruction(
        &mut self,
        _kernel: &Kernel,
        _work_group: u32,
        _wavefront: u32,
        _pc: u32,
        _inst: &Instruction,
    ) {
    }
}
