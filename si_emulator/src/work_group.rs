// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative scheduling of the wavefronts of one work group.

use alloc::vec::Vec;

use tracing::debug;

use crate::error::EmulatorError;
use crate::kernel::Kernel;
use crate::memory::{Lds, Memory};
use crate::stats::InstructionCounters;
use crate::trace::{ScopeKind, TraceMask, TraceSink};
use crate::wavefront::{ExecContext, GroupProgress, Wavefront};

/// Wavefronts that share an LDS and synchronize at barriers.
#[derive(Clone, Debug)]
pub struct WorkGroup {
    id: u32,
    wavefronts: Vec<Wavefront>,
    lds: Lds,
    progress: GroupProgress,
}

impl WorkGroup {
    /// Creates a work group over `wavefronts` with a zeroed LDS of `lds_size` bytes.
    #[must_use]
    pub fn new(id: u32, wavefronts: Vec<Wavefront>, lds_size: usize) -> Self {
        let count = u32::try_from(wavefronts.len()).unwrap_or(u32::MAX);
        let mut progress = GroupProgress::new(count);
        for wf in &wavefronts {
            if wf.is_finished() {
                progress.finished += 1;
            }
        }
        Self {
            id,
            wavefronts,
            lds: Lds::new(lds_size),
            progress,
        }
    }

    /// Linear work-group id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Wavefronts in dispatch order.
    #[must_use]
    pub fn wavefronts(&self) -> &[Wavefront] {
        &self.wavefronts
    }

    /// Wavefronts, for setup before execution.
    pub fn wavefronts_mut(&mut self) -> &mut [Wavefront] {
        &mut self.wavefronts
    }

    /// The local data share.
    #[must_use]
    pub fn lds(&self) -> &Lds {
        &self.lds
    }

    /// The local data share, for setup before execution.
    pub fn lds_mut(&mut self) -> &mut Lds {
        &mut self.lds
    }

    /// Completion and barrier counts.
    #[must_use]
    pub fn progress(&self) -> &GroupProgress {
        &self.progress
    }

    /// Returns `true` once every wavefront has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.progress.is_finished()
    }

    /// Executes one instruction on each runnable wavefront, in list order.
    ///
    /// Finished wavefronts and wavefronts waiting at a barrier are skipped. When every wavefront
    /// of the group has reached the barrier, all of them are released for the next tick.
    /// Returns the number of instructions executed.
    pub fn tick(
        &mut self,
        kernel: &Kernel,
        global: &mut dyn Memory,
        totals: &mut InstructionCounters,
        mut trace: Option<&mut (dyn TraceSink + '_)>,
    ) -> Result<u32, EmulatorError> {
        if self.is_finished() {
            return Ok(0);
        }
        let trace_instructions = trace
            .as_deref()
            .is_some_and(|sink| sink.mask().contains(TraceMask::INSTRUCTION));

        let mut executed = 0;
        for wf in &mut self.wavefronts {
            if wf.is_finished() || wf.at_barrier() {
                continue;
            }
            if trace_instructions
                && let Some(sink) = trace.as_deref_mut()
                && let Some(inst) = kernel.fetch(wf.pc())
            {
                sink.instruction(kernel, self.id, wf.id(), wf.pc(), inst);
            }
            let mut ctx = ExecContext {
                global: &mut *global,
                lds: &mut self.lds,
                totals: &mut *totals,
                progress: &mut self.progress,
            };
            wf.execute(kernel, &mut ctx)?;
            executed += 1;
        }

        if self.progress.barrier_complete() {
            for wf in &mut self.wavefronts {
                wf.release_barrier();
            }
            self.progress.release_barrier();
            debug!(work_group = self.id, "barrier released");
        }
        if executed == 0 {
            return Err(EmulatorError::Deadlock {
                work_group: self.id,
            });
        }
        Ok(executed)
    }

    /// Ticks until every wavefront has finished.
    ///
    /// `limit` bounds `totals.total`; exceeding it ends the run with
    /// [`EmulatorError::InstructionLimit`].
    pub fn run(
        &mut self,
        kernel: &Kernel,
        global: &mut dyn Memory,
        totals: &mut InstructionCounters,
        mut trace: Option<&mut (dyn TraceSink + '_)>,
        limit: Option<u64>,
    ) -> Result<(), EmulatorError> {
        let scope = ScopeKind::WorkGroup { id: self.id };
        let trace_scopes = trace
            .as_deref()
            .is_some_and(|sink| sink.mask().contains(TraceMask::WORK_GROUP));
        if trace_scopes && let Some(sink) = trace.as_deref_mut() {
            sink.scope_enter(kernel, scope);
        }
        debug!(
            work_group = self.id,
            wavefronts = self.wavefronts.len(),
            "work group start"
        );

        let result = self.run_to_completion(kernel, global, totals, trace.as_deref_mut(), limit);

        if trace_scopes && let Some(sink) = trace.as_deref_mut() {
            sink.scope_exit(kernel, scope);
        }
        if result.is_ok() {
            debug!(work_group = self.id, "work group finished");
        }
        result
    }

    fn run_to_completion(
        &mut self,
        kernel: &Kernel,
        global: &mut dyn Memory,
        totals: &mut InstructionCounters,
        mut trace: Option<&mut (dyn TraceSink + '_)>,
        limit: Option<u64>,
    ) -> Result<(), EmulatorError> {
        while !self.is_finished() {
            self.tick(kernel, global, totals, trace.as_deref_mut())?;
            if let Some(limit) = limit
                && totals.total > limit
            {
                return Err(EmulatorError::InstructionLimit { limit });
            }
        }
        Ok(())
    }
}
