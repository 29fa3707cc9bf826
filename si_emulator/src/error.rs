// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use core::fmt;

use si_isa::Format;

/// Memory access failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoryError {
    /// The access falls outside the memory.
    OutOfBounds {
        /// First byte accessed.
        address: u64,
        /// Access size in bytes.
        size: usize,
    },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { address, size } => {
                write!(f, "access of {size} bytes at {address:#x} is out of bounds")
            }
        }
    }
}

impl core::error::Error for MemoryError {}

/// Emulation failures. All of them end the current run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmulatorError {
    /// No instruction starts at the program counter.
    BadPc {
        /// The program counter.
        pc: u32,
    },
    /// A scalar operand index is reserved, or not writable.
    InvalidScalarRegister {
        /// The scalar index.
        index: u32,
    },
    /// A vector register index is past the wavefront's register count.
    InvalidVectorRegister {
        /// The register index.
        index: u32,
    },
    /// An operand kind the instruction cannot take, such as a vector register in a scalar slot.
    InvalidOperand {
        /// The instruction.
        mnemonic: &'static str,
    },
    /// The opcode is known but has no semantics in this emulator.
    UnimplementedOpcode {
        /// Encoding format.
        format: Format,
        /// Assembler mnemonic.
        mnemonic: &'static str,
    },
    /// A memory instruction with no read/write classification.
    UnclassifiedMemoryOpcode {
        /// Encoding format.
        format: Format,
        /// Opcode number within the format.
        op: u16,
    },
    /// A memory access failed.
    Memory(MemoryError),
    /// No wavefront of an unfinished work group can make progress.
    Deadlock {
        /// The stuck work group.
        work_group: u32,
    },
    /// The configured instruction budget was exhausted.
    InstructionLimit {
        /// The budget.
        limit: u64,
    },
    /// `execute` was called on a wavefront that already ended.
    WavefrontFinished,
    /// The configuration or launch description is unusable.
    InvalidConfig {
        /// What is wrong.
        reason: Box<str>,
    },
}

impl fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadPc { pc } => write!(f, "no instruction at pc {pc:#x}"),
            Self::InvalidScalarRegister { index } => {
                write!(f, "invalid scalar register index: {index}")
            }
            Self::InvalidVectorRegister { index } => {
                write!(f, "invalid vector register index: {index}")
            }
            Self::InvalidOperand { mnemonic } => write!(f, "invalid operand for {mnemonic}"),
            Self::UnimplementedOpcode { format, mnemonic } => {
                write!(f, "unimplemented {format} opcode: {mnemonic}")
            }
            Self::UnclassifiedMemoryOpcode { format, op } => write!(
                f,
                "{format} opcode {op} is not classified as a read or a write"
            ),
            Self::Memory(e) => write!(f, "memory error: {e}"),
            Self::Deadlock { work_group } => {
                write!(f, "work group {work_group} cannot make progress")
            }
            Self::InstructionLimit { limit } => {
                write!(f, "instruction limit of {limit} exceeded")
            }
            Self::WavefrontFinished => write!(f, "wavefront already finished"),
            Self::InvalidConfig { reason } => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl core::error::Error for EmulatorError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Memory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MemoryError> for EmulatorError {
    fn from(e: MemoryError) -> Self {
        Self::Memory(e)
    }
}

/// Kernel assembly failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KernelError {
    /// A label was bound twice.
    DuplicateLabel {
        /// The label.
        label: Box<str>,
    },
    /// A branch names a label that was never bound.
    UnknownLabel {
        /// The label.
        label: Box<str>,
    },
    /// The branch distance does not fit the 16-bit dword offset.
    BranchOutOfRange {
        /// The label.
        label: Box<str>,
    },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateLabel { label } => write!(f, "label bound twice: {label}"),
            Self::UnknownLabel { label } => write!(f, "unknown label: {label}"),
            Self::BranchOutOfRange { label } => write!(f, "branch to {label} is out of range"),
        }
    }
}

impl core::error::Error for KernelError {}
