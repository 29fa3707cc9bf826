// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The wavefront execution engine.
//!
//! [`Wavefront::execute`] runs exactly one instruction: fetch at the program counter, classify
//! the memory behavior, count it, dispatch it to the lanes chosen by the format's lane policy,
//! then either advance the program counter or finish.

use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::error::EmulatorError;
use crate::instruction::{Instruction, LanePolicy};
use crate::isa::{self, Control, Lane};
use crate::kernel::Kernel;
use crate::memory::{Lds, Memory};
use crate::register::{ScalarRegisterFile, VectorRegisterFile};
use crate::stats::{AccessFlags, InstructionCounters};

/// Lane used for instructions that ignore the active mask.
const SCALAR_LANE: u32 = 0;

/// One lane's contribution to an `exp` instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Export {
    /// Export target.
    pub target: u8,
    /// Exporting lane.
    pub lane: u32,
    /// Mask of the components that carry data.
    pub enabled: u8,
    /// Component values; disabled components are zero.
    pub values: [u32; 4],
    /// Set on the final export of the program.
    pub done: bool,
}

/// Completion and barrier state shared by the wavefronts of one work group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupProgress {
    wavefronts: u32,
    pub(crate) finished: u32,
    pub(crate) at_barrier: u32,
}

impl GroupProgress {
    /// Tracks a group of `wavefronts` wavefronts, none finished.
    #[must_use]
    pub fn new(wavefronts: u32) -> Self {
        Self {
            wavefronts,
            finished: 0,
            at_barrier: 0,
        }
    }

    /// Wavefronts in the group.
    #[must_use]
    pub fn wavefronts(&self) -> u32 {
        self.wavefronts
    }

    /// Wavefronts that have executed `s_endpgm`.
    #[must_use]
    pub fn finished(&self) -> u32 {
        self.finished
    }

    /// Wavefronts waiting at a barrier.
    #[must_use]
    pub fn at_barrier(&self) -> u32 {
        self.at_barrier
    }

    /// Returns `true` once every wavefront of the group has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished == self.wavefronts
    }

    /// Returns `true` when every wavefront of the group waits at the barrier.
    pub(crate) fn barrier_complete(&self) -> bool {
        self.at_barrier > 0 && self.at_barrier == self.wavefronts
    }

    pub(crate) fn release_barrier(&mut self) {
        self.at_barrier = 0;
    }
}

/// Resources outside the wavefront that an instruction may touch.
pub struct ExecContext<'a> {
    /// Global memory.
    pub global: &'a mut dyn Memory,
    /// The work group's local data share.
    pub lds: &'a mut Lds,
    /// Emulator-wide instruction counters.
    pub totals: &'a mut InstructionCounters,
    /// Completion state of the owning work group.
    pub progress: &'a mut GroupProgress,
}

impl core::fmt::Debug for ExecContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExecContext")
            .field("lds_size", &self.lds.size())
            .field("totals", &self.totals)
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

/// A group of lanes executing one instruction stream in lockstep.
#[derive(Clone, Debug)]
pub struct Wavefront {
    work_group: u32,
    id: u32,
    lane_count: u32,
    pc: u32,
    sregs: ScalarRegisterFile,
    vregs: VectorRegisterFile,
    finished: bool,
    at_barrier: bool,
    counters: InstructionCounters,
    last_access: AccessFlags,
    exports: Vec<Export>,
}

impl Wavefront {
    /// Creates a wavefront at `entry_pc` with zeroed registers and an empty active mask.
    #[must_use]
    pub fn new(work_group: u32, id: u32, lane_count: u32, num_vregs: u32, entry_pc: u32) -> Self {
        Self {
            work_group,
            id,
            lane_count,
            pc: entry_pc,
            sregs: ScalarRegisterFile::new(),
            vregs: VectorRegisterFile::new(lane_count, num_vregs),
            finished: false,
            at_barrier: false,
            counters: InstructionCounters::default(),
            last_access: AccessFlags::NONE,
            exports: Vec::new(),
        }
    }

    /// Executes the instruction at the program counter.
    pub fn execute(
        &mut self,
        kernel: &Kernel,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), EmulatorError> {
        if self.finished {
            return Err(EmulatorError::WavefrontFinished);
        }
        let pc = self.pc;
        let inst = kernel.fetch(pc).ok_or(EmulatorError::BadPc { pc })?;
        let access = isa::memory::classify(inst)?;
        trace!(
            work_group = self.work_group,
            wavefront = self.id,
            pc,
            inst = inst.mnemonic(),
            "execute"
        );

        let kind = inst.kind();
        self.counters.record(kind);
        ctx.totals.record(kind);
        self.last_access = access;

        let mut control = Control::default();
        // Decided once, so an instruction that rewrites EXEC does not change its own lane set.
        let exec = self.sregs.exec();
        match inst.policy() {
            LanePolicy::Scalar => self.run_lane(inst, SCALAR_LANE, false, &mut control, ctx)?,
            LanePolicy::ActiveLanes => {
                for lane in 0..self.lane_count.min(64) {
                    if exec & (1 << lane) != 0 {
                        self.run_lane(inst, lane, true, &mut control, ctx)?;
                    }
                }
            }
            LanePolicy::FirstActiveLane => {
                let lane = if exec == 0 { 0 } else { exec.trailing_zeros() };
                self.run_lane(inst, lane, true, &mut control, ctx)?;
            }
        }

        if control.at_barrier {
            self.at_barrier = true;
            ctx.progress.at_barrier += 1;
        }
        if control.finished {
            self.finished = true;
            ctx.progress.finished += 1;
            debug!(
                work_group = self.work_group,
                wavefront = self.id,
                instructions = self.counters.total,
                "wavefront finished"
            );
        } else {
            self.pc = control.branch_target.unwrap_or(pc + inst.size());
        }
        Ok(())
    }

    fn run_lane(
        &mut self,
        inst: &Instruction,
        lane: u32,
        with_vregs: bool,
        control: &mut Control,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), EmulatorError> {
        let vregs: &mut [u32] = if with_vregs {
            self.vregs.lane_mut(lane)
        } else {
            &mut []
        };
        let mut lane = Lane {
            id: lane,
            pc: self.pc,
            sregs: &mut self.sregs,
            vregs,
            control,
            exports: &mut self.exports,
            global: &mut *ctx.global,
            lds: &mut *ctx.lds,
        };
        isa::execute(inst, &mut lane)
    }

    pub(crate) fn release_barrier(&mut self) {
        self.at_barrier = false;
    }

    /// Work group this wavefront belongs to.
    #[must_use]
    pub fn work_group(&self) -> u32 {
        self.work_group
    }

    /// Index within the work group.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number of lanes.
    #[must_use]
    pub fn lane_count(&self) -> u32 {
        self.lane_count
    }

    /// Byte offset of the next instruction. Frozen once finished.
    #[must_use]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Returns `true` after `s_endpgm`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns `true` while waiting at a barrier.
    #[must_use]
    pub fn at_barrier(&self) -> bool {
        self.at_barrier
    }

    /// Returns `true` if `lane` is enabled in EXEC.
    #[must_use]
    pub fn is_lane_active(&self, lane: u32) -> bool {
        lane < self.lane_count && self.sregs.is_lane_active(lane)
    }

    /// Scalar registers.
    #[must_use]
    pub fn sregs(&self) -> &ScalarRegisterFile {
        &self.sregs
    }

    /// Scalar registers, for setup before execution.
    pub fn sregs_mut(&mut self) -> &mut ScalarRegisterFile {
        &mut self.sregs
    }

    /// Vector registers.
    #[must_use]
    pub fn vregs(&self) -> &VectorRegisterFile {
        &self.vregs
    }

    /// Vector registers, for setup before execution.
    pub fn vregs_mut(&mut self) -> &mut VectorRegisterFile {
        &mut self.vregs
    }

    /// Instructions executed so far, by kind.
    #[must_use]
    pub fn counters(&self) -> &InstructionCounters {
        &self.counters
    }

    /// Memory behavior of the most recent instruction.
    #[must_use]
    pub fn last_access(&self) -> AccessFlags {
        self.last_access
    }

    /// Exports recorded so far.
    #[must_use]
    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    pub(crate) fn take_exports(&mut self) -> Vec<Export> {
        core::mem::take(&mut self.exports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Operand, Sop2, Sopp, Vop1, Vop2};
    use crate::kernel::KernelBuilder;
    use crate::memory::FlatMemory;
    use si_isa::{Sop2Op, SoppOp, Vop1Op, Vop2Op};

    struct Fixture {
        global: FlatMemory,
        lds: Lds,
        totals: InstructionCounters,
        progress: GroupProgress,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                global: FlatMemory::new(),
                lds: Lds::new(256),
                totals: InstructionCounters::default(),
                progress: GroupProgress::new(1),
            }
        }

        fn step(&mut self, wf: &mut Wavefront, kernel: &Kernel) -> Result<(), EmulatorError> {
            let mut ctx = ExecContext {
                global: &mut self.global,
                lds: &mut self.lds,
                totals: &mut self.totals,
                progress: &mut self.progress,
            };
            wf.execute(kernel, &mut ctx)
        }
    }

    fn endpgm() -> Sopp {
        Sopp {
            op: SoppOp::SEndpgm,
            simm16: 0,
        }
    }

    #[test]
    fn scalar_instruction_runs_with_empty_exec() {
        let mut b = KernelBuilder::new("k");
        b.push(Sop2 {
            op: Sop2Op::SAddU32,
            sdst: 0,
            ssrc0: Operand::int(1),
            ssrc1: Operand::int(2),
        });
        let kernel = b.build().unwrap();
        let mut wf = Wavefront::new(0, 0, 64, 4, 0);
        let mut fx = Fixture::new();
        fx.step(&mut wf, &kernel).unwrap();
        assert_eq!(wf.sregs().read(0), Ok(3));
        assert_eq!(wf.pc(), 4);
        assert_eq!(wf.counters().scalar_alu, 1);
        assert_eq!(fx.totals.scalar_alu, 1);
    }

    #[test]
    fn vector_instruction_skips_inactive_lanes() {
        let mut b = KernelBuilder::new("k");
        b.push(Vop2 {
            op: Vop2Op::VAddI32,
            vdst: 1,
            src0: Operand::int(5),
            vsrc1: 0,
        });
        let kernel = b.build().unwrap();
        let mut wf = Wavefront::new(0, 0, 64, 2, 0);
        for lane in 0..64 {
            wf.vregs_mut().set(lane, 0, lane).unwrap();
        }
        wf.sregs_mut().set_exec((1 << 0) | (1 << 40));
        let before = wf.vregs().clone();
        Fixture::new().step(&mut wf, &kernel).unwrap();
        for lane in 0..64 {
            let expected = match lane {
                0 => [0, 5],
                40 => [40, 45],
                _ => [before.get(lane, 0).unwrap(), before.get(lane, 1).unwrap()],
            };
            assert_eq!(wf.vregs().lane(lane), expected, "lane {lane}");
        }
    }

    #[test]
    fn readfirstlane_uses_lowest_active_lane_or_lane_zero() {
        let mut b = KernelBuilder::new("k");
        b.push(Vop1 {
            op: Vop1Op::VReadfirstlaneB32,
            vdst: 7,
            src0: Operand::Vreg(0),
        });
        let kernel = b.build().unwrap();

        let mut wf = Wavefront::new(0, 0, 64, 1, 0);
        for lane in 0..64 {
            wf.vregs_mut().set(lane, 0, 100 + lane).unwrap();
        }
        wf.sregs_mut().set_exec(0b1011_0000);
        Fixture::new().step(&mut wf, &kernel).unwrap();
        assert_eq!(wf.sregs().read(7), Ok(104));

        let mut wf = Wavefront::new(0, 0, 64, 1, 0);
        wf.vregs_mut().set(0, 0, 9).unwrap();
        Fixture::new().step(&mut wf, &kernel).unwrap();
        assert_eq!(wf.sregs().read(7), Ok(9), "falls back to lane 0");
    }

    #[test]
    fn finishing_freezes_pc_and_updates_group() {
        let mut b = KernelBuilder::new("k");
        b.push(Sopp {
            op: SoppOp::SNop,
            simm16: 0,
        });
        let end = b.push(endpgm());
        let kernel = b.build().unwrap();
        let mut wf = Wavefront::new(0, 0, 64, 1, 0);
        let mut fx = Fixture::new();
        fx.step(&mut wf, &kernel).unwrap();
        assert!(!fx.progress.is_finished(), "one instruction left");
        fx.step(&mut wf, &kernel).unwrap();
        assert!(wf.is_finished(), "endpgm executed");
        assert_eq!(wf.pc(), end);
        assert!(fx.progress.is_finished(), "sole wavefront finished");
        assert_eq!(
            fx.step(&mut wf, &kernel),
            Err(EmulatorError::WavefrontFinished)
        );
    }

    #[test]
    fn branch_replaces_sequential_advance() {
        let mut b = KernelBuilder::new("k");
        b.branch(SoppOp::SBranch, "end");
        b.push(Sopp {
            op: SoppOp::SNop,
            simm16: 0,
        });
        b.label("end").unwrap();
        b.push(endpgm());
        let kernel = b.build().unwrap();
        let mut wf = Wavefront::new(0, 0, 64, 1, 0);
        let mut fx = Fixture::new();
        fx.step(&mut wf, &kernel).unwrap();
        assert_eq!(wf.pc(), 8);
        assert_eq!(wf.counters().branch, 1);
    }

    #[test]
    fn bad_pc_is_reported() {
        let kernel = KernelBuilder::new("empty").build().unwrap();
        let mut wf = Wavefront::new(0, 0, 64, 1, 0);
        assert_eq!(
            Fixture::new().step(&mut wf, &kernel),
            Err(EmulatorError::BadPc { pc: 0 })
        );
    }

    #[test]
    fn barrier_and_waitcnt_are_classified() {
        let mut b = KernelBuilder::new("k");
        b.push(Sopp {
            op: SoppOp::SWaitcnt,
            simm16: 0,
        });
        b.push(Sopp {
            op: SoppOp::SBarrier,
            simm16: 0,
        });
        let kernel = b.build().unwrap();
        let mut wf = Wavefront::new(0, 0, 64, 1, 0);
        let mut fx = Fixture::new();
        fx.step(&mut wf, &kernel).unwrap();
        assert!(wf.last_access().contains(AccessFlags::MEM_WAIT), "waitcnt");
        fx.step(&mut wf, &kernel).unwrap();
        assert!(wf.last_access().contains(AccessFlags::BARRIER), "barrier");
        assert!(wf.at_barrier(), "waiting");
        assert_eq!(fx.progress.at_barrier(), 1);
        assert_eq!(wf.pc(), 8, "resumes after the barrier");
    }
}
