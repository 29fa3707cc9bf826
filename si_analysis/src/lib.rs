// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Register analyses for the Southern Islands kernel compiler back end.
//!
//! A [`Function`] is built from basic blocks of [`Instruction`]s with symbolic register
//! arguments. [`LivenessAnalysis`] computes per-block def/use/live-in/live-out sets for the vector
//! and scalar register classes, and [`ConflictGraphs`] turns those into interference graphs for a
//! register allocator.
//!
//! ```
//! use si_analysis::{Argument, ConflictGraphs, Function, Instruction, LivenessAnalysis};
//! use si_isa::Vop2Op;
//!
//! let mut f = Function::new("kernel", 3, 0);
//! let entry = f.add_block("entry");
//! f.push(
//!     entry,
//!     Instruction::new(
//!         Vop2Op::VAddI32,
//!         vec![Argument::vdst(2), Argument::vsrc(0), Argument::vsrc(1)],
//!     ),
//! )?;
//!
//! let mut liveness = LivenessAnalysis::new(&f);
//! liveness.run();
//! let graphs = ConflictGraphs::build(&liveness)?;
//! assert_eq!(graphs.vector.edge_count(), 0);
//! # Ok::<(), Box<dyn core::error::Error>>(())
//! ```

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod bitset;
pub mod cfg;
mod conflict;
mod dataflow;
mod error;
mod ir;
mod liveness;
mod pass_info;

pub use bitset::{BitSet, Ones};
pub use conflict::{ConflictGraph, ConflictGraphNode, ConflictGraphs, NodeState};
pub use error::{CfgError, GraphError};
pub use ir::{Argument, BasicBlock, BlockId, Direction, Function, Instruction};
pub use liveness::{BlockLivenessInfo, LivenessAnalysis, RegisterLiveness};
pub use pass_info::PassInfoPool;
