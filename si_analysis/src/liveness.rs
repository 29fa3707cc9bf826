// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backwards register liveness, tracked separately for vector and scalar registers.
//!
//! The pass runs in two phases:
//!
//! 1. Local def/use per block. Instructions are scanned in reverse, and within one instruction
//!    destinations are applied before sources, so the earliest mention in program order wins. A
//!    register that is read and then redefined in the same block is therefore still a use.
//! 2. A backward fixpoint of `out[B] = ∪ in[S]` and `in[B] = (out[B] - def[B]) | use[B]`. Blocks
//!    without successors take the function's declared live-out registers (empty by default).

use alloc::vec::Vec;
use core::fmt;

use si_isa::RegClass;
use tracing::debug;

use crate::bitset::BitSet;
use crate::cfg;
use crate::dataflow;
use crate::ir::{BasicBlock, BlockId, Direction, Function};
use crate::pass_info::PassInfoPool;

/// Liveness sets of one register class in one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterLiveness {
    /// Registers written in the block before any later read in the block.
    pub defs: BitSet,
    /// Registers read in the block before any local write.
    pub uses: BitSet,
    /// Registers live on entry.
    pub live_in: BitSet,
    /// Registers live on exit.
    pub live_out: BitSet,
}

impl RegisterLiveness {
    fn new_empty(size: usize) -> Self {
        Self {
            defs: BitSet::new_empty(size),
            uses: BitSet::new_empty(size),
            live_in: BitSet::new_empty(size),
            live_out: BitSet::new_empty(size),
        }
    }
}

/// Liveness of one block, for both register classes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockLivenessInfo {
    /// Vector register sets.
    pub vector: RegisterLiveness,
    /// Scalar register sets.
    pub scalar: RegisterLiveness,
}

impl BlockLivenessInfo {
    /// The sets for `class`.
    #[must_use]
    #[inline]
    pub fn class(&self, class: RegClass) -> &RegisterLiveness {
        match class {
            RegClass::Vector => &self.vector,
            RegClass::Scalar => &self.scalar,
        }
    }

    fn class_mut(&mut self, class: RegClass) -> &mut RegisterLiveness {
        match class {
            RegClass::Vector => &mut self.vector,
            RegClass::Scalar => &mut self.scalar,
        }
    }
}

/// Liveness analysis over one function.
///
/// Results live in a per-block [`PassInfoPool`] owned by the pass and are only visible once
/// [`run`](Self::run) has completed.
#[derive(Debug)]
pub struct LivenessAnalysis<'f> {
    function: &'f Function,
    pool: PassInfoPool<BlockLivenessInfo>,
    visits: usize,
}

impl<'f> LivenessAnalysis<'f> {
    /// Creates the pass for `function`. Nothing is computed until [`run`](Self::run).
    #[must_use]
    pub fn new(function: &'f Function) -> Self {
        Self {
            function,
            pool: PassInfoPool::new(function.blocks().len()),
            visits: 0,
        }
    }

    /// The analysed function.
    #[must_use]
    pub fn function(&self) -> &'f Function {
        self.function
    }

    /// Computes def/use/live-in/live-out for every block, replacing any earlier results.
    ///
    /// Returns the number of block visits the fixpoint needed.
    pub fn run(&mut self) -> usize {
        let function = self.function;
        debug!(
            function = function.name(),
            blocks = function.blocks().len(),
            "liveness start"
        );

        self.pool.clear();
        let num_v = function.register_count(RegClass::Vector) as usize;
        let num_s = function.register_count(RegClass::Scalar) as usize;
        for block in function.blocks() {
            let mut info = BlockLivenessInfo {
                vector: RegisterLiveness::new_empty(num_v),
                scalar: RegisterLiveness::new_empty(num_s),
            };
            compute_def_use(block, &mut info);
            self.pool.insert(block.id(), info);
        }

        let order = cfg::postorder(function);
        self.visits = 0;
        for class in [RegClass::Vector, RegClass::Scalar] {
            self.visits += self.solve_class(class, &order);
        }

        debug!(
            function = function.name(),
            visits = self.visits,
            "liveness converged"
        );
        self.visits
    }

    fn solve_class(&mut self, class: RegClass, order: &[BlockId]) -> usize {
        let function = self.function;
        let size = function.register_count(class) as usize;
        let mut exit = BitSet::new_empty(size);
        for &r in function.live_out(class) {
            exit.set(r as usize);
        }

        let pool = &self.pool;
        let empty = RegisterLiveness::new_empty(size);
        let sets_of = |b: &BasicBlock| pool.get(b.id()).map_or(&empty, |info| info.class(class));
        let solution = dataflow::solve_backward(
            function,
            order,
            BitSet::new_empty(size),
            &exit,
            |acc, succ_in| acc.union_with(succ_in),
            |_, block, out| {
                // IN = USE ∪ (OUT \ DEF)
                let sets = sets_of(block);
                let mut in_set = out - &sets.defs;
                in_set.union_with(&sets.uses);
                in_set
            },
        );

        let mut live = solution.in_states.into_iter().zip(solution.out_states);
        for block in function.blocks() {
            let Some((live_in, live_out)) = live.next() else {
                break;
            };
            if let Some(info) = self.pool.get_mut(block.id()) {
                let sets = info.class_mut(class);
                sets.live_in = live_in;
                sets.live_out = live_out;
            }
        }
        solution.visits
    }

    /// Returns the liveness of `block`, or `None` before [`run`](Self::run).
    #[must_use]
    pub fn info(&self, block: BlockId) -> Option<&BlockLivenessInfo> {
        self.pool.get(block)
    }

    /// Block visits performed by the last [`run`](Self::run).
    #[must_use]
    pub fn visits(&self) -> usize {
        self.visits
    }

    /// Writes every block's live-in and live-out registers.
    pub fn dump(&self, out: &mut impl fmt::Write) -> fmt::Result {
        writeln!(out, "liveness of {}", self.function.name())?;
        for block in self.function.blocks() {
            writeln!(out, "bb{} ({}):", block.id().index(), block.name())?;
            let Some(info) = self.pool.get(block.id()) else {
                writeln!(out, "  not computed")?;
                continue;
            };
            for class in [RegClass::Vector, RegClass::Scalar] {
                let sets = info.class(class);
                let label = match class {
                    RegClass::Vector => "vector",
                    RegClass::Scalar => "scalar",
                };
                write!(out, "  {label} live-in: ")?;
                write_registers(out, class, &sets.live_in)?;
                write!(out, "\n  {label} live-out: ")?;
                write_registers(out, class, &sets.live_out)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

fn compute_def_use(block: &BasicBlock, info: &mut BlockLivenessInfo) {
    for inst in block.instructions().iter().rev() {
        for class in [RegClass::Vector, RegClass::Scalar] {
            let sets = info.class_mut(class);
            for r in inst.registers(class, Direction::Destination) {
                sets.defs.set(r as usize);
                sets.uses.clear(r as usize);
            }
            for r in inst.registers(class, Direction::Source) {
                sets.uses.set(r as usize);
                sets.defs.clear(r as usize);
            }
        }
    }
}

fn write_registers(
    out: &mut impl fmt::Write,
    class: RegClass,
    set: &BitSet,
) -> fmt::Result {
    let regs: Vec<usize> = set.ones().collect();
    if regs.is_empty() {
        return out.write_str("-");
    }
    for (i, r) in regs.iter().enumerate() {
        if i > 0 {
            out.write_char(' ')?;
        }
        write!(out, "{}{r}", class.prefix())?;
    }
    Ok(())
}
