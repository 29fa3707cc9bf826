// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Functional emulator for Southern Islands compute kernels.
//!
//! Kernels are sequences of already-decoded [`Instruction`]s assembled with a [`KernelBuilder`].
//! A [`Wavefront`] executes them one at a time over up to 64 lanes, scalar instructions once and
//! vector instructions for every lane set in EXEC. A [`WorkGroup`] interleaves its wavefronts
//! round-robin and synchronizes them at barriers, and the [`Emulator`] splits an [`NdRange`] into
//! work groups that run to completion one after another.
//!
//! ```
//! use si_emulator::{
//!     Emulator, EmulatorConfig, FlatMemory, KernelBuilder, Mubuf, NdRange, Operand, Sopp, Vop2,
//! };
//! use si_isa::{MubufOp, SoppOp, Vop2Op};
//!
//! // out[lane] = lane + 7
//! let mut b = KernelBuilder::new("add7");
//! b.push(Vop2 { op: Vop2Op::VAddI32, vdst: 1, src0: Operand::int(7), vsrc1: 0 });
//! b.push(Vop2 { op: Vop2Op::VLshlrevB32, vdst: 2, src0: Operand::int(2), vsrc1: 0 });
//! let mut store = Mubuf::new(MubufOp::BufferStoreDword, 1, 2, 0);
//! store.offen = true;
//! b.push(store);
//! b.push(Sopp { op: SoppOp::SEndpgm, simm16: 0 });
//! let kernel = b.build()?;
//!
//! let mut emu = Emulator::new(EmulatorConfig::default(), FlatMemory::new())?;
//! let summary = emu.run(&kernel, &NdRange::linear(8, 8, vec![0x100, 0, 0, 0]), None)?;
//! assert_eq!(summary.wavefronts, 1);
//! assert_eq!(emu.memory().read_words(0x100, 3)?, [7, 8, 9]);
//! # Ok::<(), Box<dyn core::error::Error>>(())
//! ```

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod emulator;
mod error;
mod instruction;
mod isa;
mod kernel;
mod memory;
mod register;
mod stats;
mod trace;
mod wavefront;
mod work_group;

pub use emulator::{Emulator, EmulatorConfig, MAX_WAVEFRONT_SIZE, NdRange, RunSummary};
pub use error::{EmulatorError, KernelError, MemoryError};
pub use instruction::{
    Ds, Exp, Instruction, Mimg, Mtbuf, Mubuf, Operand, Smrd, SmrdOffset, Sop1, Sop2, Sopc, Sopk,
    Sopp, Vintrp, Vop1, Vop2, Vop3a, Vop3b, Vopc,
};
pub use kernel::{Kernel, KernelBuilder};
pub use memory::{FlatMemory, Lds, Memory};
pub use register::{ScalarRegisterFile, VectorRegisterFile};
pub use stats::{AccessFlags, InstructionCounters, InstructionKind};
pub use trace::{ScopeKind, TraceMask, TraceSink};
pub use wavefront::{ExecContext, Export, GroupProgress, Wavefront};
pub use work_group::WorkGroup;
