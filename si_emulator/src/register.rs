// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar and vector register files of a wavefront.

use alloc::vec;
use alloc::vec::Vec;

use si_isa::sreg;

use crate::error::EmulatorError;

/// The 256-entry scalar operand space of one wavefront.
///
/// General-purpose SGPRs, VCC, M0 and EXEC are writable. Inline constants are pre-populated and
/// read-only. VCCZ and EXECZ track VCC and EXEC on every write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalarRegisterFile {
    regs: Vec<u32>,
}

impl Default for ScalarRegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalarRegisterFile {
    /// Creates a register file with every register zero and EXEC empty.
    #[must_use]
    pub fn new() -> Self {
        let mut regs = vec![0; sreg::SPACE_SIZE];
        for (index, slot) in (0_u32..).zip(regs.iter_mut()) {
            if let Some(value) = sreg::inline_constant(index) {
                *slot = value;
            }
        }
        regs[sreg::VCCZ as usize] = 1;
        regs[sreg::EXECZ as usize] = 1;
        Self { regs }
    }

    /// Reads a scalar operand index.
    pub fn read(&self, index: u32) -> Result<u32, EmulatorError> {
        if sreg::is_reserved(index) || index == sreg::LITERAL {
            return Err(EmulatorError::InvalidScalarRegister { index });
        }
        Ok(self.regs[index as usize])
    }

    /// Writes a scalar register.
    pub fn write(&mut self, index: u32, value: u32) -> Result<(), EmulatorError> {
        let writable = index < sreg::SGPR_COUNT
            || matches!(
                index,
                sreg::VCC_LO | sreg::VCC_HI | sreg::M0 | sreg::EXEC_LO | sreg::EXEC_HI
            );
        if !writable {
            return Err(EmulatorError::InvalidScalarRegister { index });
        }
        self.regs[index as usize] = value;
        match index {
            sreg::VCC_LO | sreg::VCC_HI => {
                self.regs[sreg::VCCZ as usize] = u32::from(self.vcc() == 0);
            }
            sreg::EXEC_LO | sreg::EXEC_HI => {
                self.regs[sreg::EXECZ as usize] = u32::from(self.exec() == 0);
            }
            _ => {}
        }
        Ok(())
    }

    /// Reads the register pair starting at `index` (low word first).
    pub fn read_pair(&self, index: u32) -> Result<u64, EmulatorError> {
        let lo = self.read(index)?;
        let hi = self.read(index + 1)?;
        Ok(u64::from(lo) | (u64::from(hi) << 32))
    }

    /// Writes the register pair starting at `index`.
    pub fn write_pair(&mut self, index: u32, value: u64) -> Result<(), EmulatorError> {
        let (lo, hi) = split(value);
        self.write(index, lo)?;
        self.write(index + 1, hi)
    }

    /// The active mask.
    #[must_use]
    pub fn exec(&self) -> u64 {
        self.pair(sreg::EXEC_LO)
    }

    /// Replaces the active mask.
    pub fn set_exec(&mut self, mask: u64) {
        self.set_pair(sreg::EXEC_LO, mask);
        self.regs[sreg::EXECZ as usize] = u32::from(mask == 0);
    }

    /// The vector condition code.
    #[must_use]
    pub fn vcc(&self) -> u64 {
        self.pair(sreg::VCC_LO)
    }

    /// Replaces the vector condition code.
    pub fn set_vcc(&mut self, vcc: u64) {
        self.set_pair(sreg::VCC_LO, vcc);
        self.regs[sreg::VCCZ as usize] = u32::from(vcc == 0);
    }

    /// The scalar condition code.
    #[must_use]
    pub fn scc(&self) -> bool {
        self.regs[sreg::SCC as usize] & 1 != 0
    }

    /// Sets the scalar condition code.
    pub fn set_scc(&mut self, scc: bool) {
        self.regs[sreg::SCC as usize] = u32::from(scc);
    }

    /// The M0 register.
    #[must_use]
    pub fn m0(&self) -> u32 {
        self.regs[sreg::M0 as usize]
    }

    /// Returns `true` if `lane` is enabled in EXEC.
    ///
    /// Lanes 0..32 read `EXEC_LO`; lanes 32..64 read `EXEC_HI`.
    #[must_use]
    pub fn is_lane_active(&self, lane: u32) -> bool {
        match lane {
            0..32 => self.regs[sreg::EXEC_LO as usize] & (1 << lane) != 0,
            32..64 => self.regs[sreg::EXEC_HI as usize] & (1 << (lane - 32)) != 0,
            _ => false,
        }
    }

    fn pair(&self, index: u32) -> u64 {
        let i = index as usize;
        u64::from(self.regs[i]) | (u64::from(self.regs[i + 1]) << 32)
    }

    fn set_pair(&mut self, index: u32, value: u64) {
        let i = index as usize;
        (self.regs[i], self.regs[i + 1]) = split(value);
    }
}

/// Splits a 64-bit value into its low and high words.
#[allow(
    clippy::cast_possible_truncation,
    reason = "each half is masked to 32 bits by the shift or the cast"
)]
pub(crate) fn split(value: u64) -> (u32, u32) {
    (value as u32, (value >> 32) as u32)
}

/// Per-lane vector registers of one wavefront, stored lane-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorRegisterFile {
    count: u32,
    regs: Vec<u32>,
}

impl VectorRegisterFile {
    /// Creates `lanes` lanes of `count` registers each, all zero.
    #[must_use]
    pub fn new(lanes: u32, count: u32) -> Self {
        Self {
            count,
            regs: vec![0; lanes as usize * count as usize],
        }
    }

    /// Registers per lane.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Reads register `index` of `lane`.
    pub fn get(&self, lane: u32, index: u32) -> Result<u32, EmulatorError> {
        self.lane(lane)
            .get(index as usize)
            .copied()
            .ok_or(EmulatorError::InvalidVectorRegister { index })
    }

    /// Writes register `index` of `lane`.
    pub fn set(&mut self, lane: u32, index: u32, value: u32) -> Result<(), EmulatorError> {
        let slot = self
            .lane_mut(lane)
            .get_mut(index as usize)
            .ok_or(EmulatorError::InvalidVectorRegister { index })?;
        *slot = value;
        Ok(())
    }

    /// All registers of `lane`. Empty if the lane does not exist.
    #[must_use]
    pub fn lane(&self, lane: u32) -> &[u32] {
        let n = self.count as usize;
        let start = lane as usize * n;
        self.regs.get(start..start + n).unwrap_or(&[])
    }

    pub(crate) fn lane_mut(&mut self, lane: u32) -> &mut [u32] {
        let n = self.count as usize;
        let start = lane as usize * n;
        self.regs.get_mut(start..start + n).unwrap_or(&mut [])
    }
}
