// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures and reference models for the conformance tests in `tests/`.
//!
//! The reference models here are deliberately naive: they recompute a property from first
//! principles so the tests can compare it with what the analyses and the emulator produce.

use std::collections::BTreeSet;

use si_analysis::{ConflictGraph, Direction, LivenessAnalysis};
use si_emulator::{
    EmulatorError, ExecContext, FlatMemory, GroupProgress, InstructionCounters, Kernel, Lds,
    Wavefront,
};
use si_isa::RegClass;

/// An unordered interference edge, stored as `(low, high)`.
pub type Edge = (u32, u32);

fn edge(a: u32, b: u32) -> Edge {
    (a.min(b), a.max(b))
}

/// Every edge of `graph`, read from the adjacency of each node.
#[must_use]
pub fn edge_set(graph: &ConflictGraph) -> BTreeSet<Edge> {
    graph
        .nodes()
        .flat_map(|node| node.neighbors().map(move |n| edge(node.id(), n)))
        .collect()
}

/// Edges implied by walking each block bottom-up from its live-out set.
///
/// A register defined by an instruction that is not a move or a `PHI` interferes with every other
/// register live at that point. Only single registers are modelled; register series are out of
/// scope for this model.
#[must_use]
pub fn reference_interference(liveness: &LivenessAnalysis<'_>, class: RegClass) -> BTreeSet<Edge> {
    let mut edges = BTreeSet::new();
    for block in liveness.function().blocks() {
        let Some(info) = liveness.info(block.id()) else {
            continue;
        };
        let mut live: BTreeSet<u32> = info
            .class(class)
            .live_out
            .ones()
            .filter_map(|r| u32::try_from(r).ok())
            .collect();
        for inst in block.instructions().iter().rev() {
            let opcode = inst.opcode();
            let defs: Vec<u32> = inst.registers(class, Direction::Destination).collect();
            if !opcode.is_move() && !opcode.is_phi() {
                for &d in &defs {
                    for &r in &live {
                        if r != d {
                            edges.insert(edge(d, r));
                        }
                    }
                }
            }
            for d in defs {
                live.remove(&d);
            }
            live.extend(inst.registers(class, Direction::Source));
        }
    }
    edges
}

/// Global memory, LDS and bookkeeping for driving a lone wavefront.
#[derive(Debug)]
pub struct Bench {
    /// Global memory.
    pub global: FlatMemory,
    /// Local data share.
    pub lds: Lds,
    /// Counters across every step.
    pub totals: InstructionCounters,
    /// Progress of the one-wavefront group.
    pub progress: GroupProgress,
}

impl Default for Bench {
    fn default() -> Self {
        Self {
            global: FlatMemory::new(),
            lds: Lds::new(4096),
            totals: InstructionCounters::default(),
            progress: GroupProgress::new(1),
        }
    }
}

impl Bench {
    /// Executes one instruction of `wf`.
    pub fn step(&mut self, wf: &mut Wavefront, kernel: &Kernel) -> Result<(), EmulatorError> {
        let mut ctx = ExecContext {
            global: &mut self.global,
            lds: &mut self.lds,
            totals: &mut self.totals,
            progress: &mut self.progress,
        };
        wf.execute(kernel, &mut ctx)
    }

    /// Steps `wf` until it finishes or `max_steps` instructions have executed.
    pub fn run(
        &mut self,
        wf: &mut Wavefront,
        kernel: &Kernel,
        max_steps: usize,
    ) -> Result<(), EmulatorError> {
        for _ in 0..max_steps {
            if wf.is_finished() {
                break;
            }
            self.step(wf, kernel)?;
        }
        Ok(())
    }
}

/// A 64-lane wavefront whose vector register `r` of lane `l` holds `l * 1000 + r`.
#[must_use]
pub fn patterned_wavefront(num_vregs: u32) -> Wavefront {
    let mut wf = Wavefront::new(0, 0, 64, num_vregs, 0);
    for lane in 0..64 {
        for reg in 0..num_vregs {
            wf.vregs_mut()
                .set(lane, reg, lane * 1000 + reg)
                .expect("lane and register are in range");
        }
    }
    wf
}
