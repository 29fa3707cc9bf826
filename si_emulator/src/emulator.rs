// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The NDRange driver: splits a launch into work groups and wavefronts and runs them.

use alloc::format;
use alloc::vec::Vec;

use tracing::debug;

use crate::error::EmulatorError;
use crate::kernel::Kernel;
use crate::memory::{FlatMemory, Memory};
use crate::stats::InstructionCounters;
use crate::trace::TraceSink;
use crate::wavefront::{Export, Wavefront};
use crate::work_group::WorkGroup;

/// Maximum lanes per wavefront; EXEC is 64 bits wide.
pub const MAX_WAVEFRONT_SIZE: u32 = 64;

/// Emulator configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmulatorConfig {
    /// Lanes per wavefront, `1..=64`.
    pub wavefront_size: u32,
    /// Vector registers per lane. At least 3, since local ids are written to `v0..v2`.
    pub num_vector_registers: u32,
    /// LDS bytes per work group.
    pub lds_size: usize,
    /// Instruction budget per [`Emulator::run`]; `None` is unbounded.
    pub max_instructions: Option<u64>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            wavefront_size: MAX_WAVEFRONT_SIZE,
            num_vector_registers: 256,
            lds_size: 64 * 1024,
            max_instructions: None,
        }
    }
}

impl EmulatorConfig {
    /// Checks that the configuration can run a kernel.
    pub fn validate(&self) -> Result<(), EmulatorError> {
        if !(1..=MAX_WAVEFRONT_SIZE).contains(&self.wavefront_size) {
            return Err(invalid(format!(
                "wavefront size {} is not in 1..=64",
                self.wavefront_size
            )));
        }
        if self.num_vector_registers < 3 {
            return Err(invalid(format!(
                "{} vector registers cannot hold the local ids",
                self.num_vector_registers
            )));
        }
        Ok(())
    }
}

fn invalid(reason: alloc::string::String) -> EmulatorError {
    EmulatorError::InvalidConfig {
        reason: reason.into_boxed_str(),
    }
}

/// A kernel launch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NdRange {
    /// Work items per dimension.
    pub global_size: [u32; 3],
    /// Work items per work group, per dimension.
    pub local_size: [u32; 3],
    /// Values written to `s0..` of every wavefront.
    pub user_sgprs: Vec<u32>,
    /// First of three SGPRs that receive the work-group id.
    pub work_group_id_sgpr: u8,
}

impl NdRange {
    /// A one-dimensional launch with the work-group id placed after `user_sgprs`.
    #[must_use]
    pub fn linear(global_size: u32, local_size: u32, user_sgprs: Vec<u32>) -> Self {
        let work_group_id_sgpr = u8::try_from(user_sgprs.len()).unwrap_or(u8::MAX);
        Self {
            global_size: [global_size, 1, 1],
            local_size: [local_size, 1, 1],
            user_sgprs,
            work_group_id_sgpr,
        }
    }

    /// Work groups per dimension.
    pub fn work_group_counts(&self) -> Result<[u32; 3], EmulatorError> {
        let mut counts = [0; 3];
        for (d, count) in counts.iter_mut().enumerate() {
            let (global, local) = (self.global_size[d], self.local_size[d]);
            if global == 0 || local == 0 {
                return Err(invalid(format!("dimension {d} has size zero")));
            }
            if global % local != 0 {
                return Err(invalid(format!(
                    "global size {global} is not a multiple of local size {local} in dimension {d}"
                )));
            }
            *count = global / local;
        }
        Ok(counts)
    }

    /// Work items per work group.
    pub fn work_group_items(&self) -> Result<u32, EmulatorError> {
        let [x, y, z] = self.local_size;
        x.checked_mul(y)
            .and_then(|xy| xy.checked_mul(z))
            .ok_or_else(|| invalid(format!("local size {x}x{y}x{z} overflows the item count")))
    }

    fn validate(&self) -> Result<(), EmulatorError> {
        let counts = self.work_group_counts()?;
        self.work_group_items()?;
        if counts
            .iter()
            .try_fold(1_u32, |acc, &c| acc.checked_mul(c))
            .is_none()
        {
            return Err(invalid(format!(
                "{counts:?} work groups overflow the work-group id"
            )));
        }
        let user = u32::try_from(self.user_sgprs.len()).unwrap_or(u32::MAX);
        let ids = u32::from(self.work_group_id_sgpr);
        if user > si_isa::sreg::SGPR_COUNT || ids + 3 > si_isa::sreg::SGPR_COUNT {
            return Err(invalid(format!(
                "{user} user SGPRs and work-group ids at s{ids} do not fit the SGPR file"
            )));
        }
        Ok(())
    }
}

/// Outcome of one [`Emulator::run`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Work groups executed.
    pub work_groups: u32,
    /// Wavefronts executed.
    pub wavefronts: u32,
    /// Instructions executed by this run.
    pub counters: InstructionCounters,
    /// Exports in work-group, then wavefront, then program order.
    pub exports: Vec<Export>,
}

/// Functional emulator over a global memory.
#[derive(Debug)]
pub struct Emulator<M: Memory = FlatMemory> {
    config: EmulatorConfig,
    memory: M,
    totals: InstructionCounters,
}

impl<M: Memory> Emulator<M> {
    /// Creates an emulator after validating `config`.
    pub fn new(config: EmulatorConfig, memory: M) -> Result<Self, EmulatorError> {
        config.validate()?;
        Ok(Self {
            config,
            memory,
            totals: InstructionCounters::default(),
        })
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Global memory.
    #[must_use]
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Global memory, for setting up inputs and reading results.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Instruction counts across every run.
    #[must_use]
    pub fn totals(&self) -> &InstructionCounters {
        &self.totals
    }

    /// Runs `kernel` over `ndrange`, one work group at a time.
    pub fn run(
        &mut self,
        kernel: &Kernel,
        ndrange: &NdRange,
        mut trace: Option<&mut (dyn TraceSink + '_)>,
    ) -> Result<RunSummary, EmulatorError> {
        ndrange.validate()?;
        let counts = ndrange.work_group_counts()?;
        let size = self.config.wavefront_size;
        if ndrange
            .work_group_items()?
            .div_ceil(size)
            .checked_mul(size)
            .is_none()
        {
            return Err(invalid(format!(
                "local size {:?} does not fit whole wavefronts of {size} lanes",
                ndrange.local_size
            )));
        }
        let mut summary = RunSummary::default();
        debug!(
            kernel = kernel.name(),
            work_groups = counts.iter().map(|&c| u64::from(c)).product::<u64>(),
            "ndrange start"
        );

        let mut run_counters = InstructionCounters::default();
        let mut result = Ok(());
        'groups: for z in 0..counts[2] {
            for y in 0..counts[1] {
                for x in 0..counts[0] {
                    let id = (z * counts[1] + y) * counts[0] + x;
                    let mut group = match self.dispatch(ndrange, id, [x, y, z]) {
                        Ok(group) => group,
                        Err(err) => {
                            result = Err(err);
                            break 'groups;
                        }
                    };
                    result = group.run(
                        kernel,
                        &mut self.memory,
                        &mut run_counters,
                        trace.as_deref_mut(),
                        self.config.max_instructions,
                    );
                    summary.work_groups += 1;
                    for wf in group.wavefronts_mut() {
                        summary.wavefronts += 1;
                        summary.exports.extend(wf.take_exports());
                    }
                    if result.is_err() {
                        break 'groups;
                    }
                }
            }
        }

        self.totals.accumulate(&run_counters);
        summary.counters = run_counters;
        result?;
        debug!(
            kernel = kernel.name(),
            instructions = summary.counters.total,
            "ndrange finished"
        );
        Ok(summary)
    }

    /// Builds work group `id` with its wavefronts' initial register state.
    fn dispatch(
        &self,
        ndrange: &NdRange,
        id: u32,
        group_id: [u32; 3],
    ) -> Result<WorkGroup, EmulatorError> {
        let [lx, ly, _] = ndrange.local_size;
        let items = ndrange.work_group_items()?;
        let size = self.config.wavefront_size;
        let count = items.div_ceil(size);
        let mut wavefronts = Vec::new();
        for w in 0..count {
            let mut wf = Wavefront::new(id, w, size, self.config.num_vector_registers, 0);
            let mut exec = 0_u64;
            for lane in 0..size {
                let item = w * size + lane;
                if item >= items {
                    break;
                }
                exec |= 1 << lane;
                let local = [item % lx, (item / lx) % ly, item / (lx * ly)];
                for (reg, value) in (0..).zip(local) {
                    wf.vregs_mut().set(lane, reg, value)?;
                }
            }
            let sregs = wf.sregs_mut();
            sregs.set_exec(exec);
            for (reg, &value) in (0..).zip(&ndrange.user_sgprs) {
                sregs.write(reg, value)?;
            }
            for (reg, value) in (u32::from(ndrange.work_group_id_sgpr)..).zip(group_id) {
                sregs.write(reg, value)?;
            }
            wavefronts.push(wf);
        }
        Ok(WorkGroup::new(id, wavefronts, self.config.lds_size))
    }
}
