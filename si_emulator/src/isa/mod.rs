// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-format instruction semantics.
//!
//! Every format executes against a [`Lane`]: the wavefront's shared scalar state plus the vector
//! registers of one lane. The wavefront decides which lanes run; the code here never looks at
//! EXEC to skip work.

use alloc::vec::Vec;

use si_isa::{Format, sreg};

use crate::error::EmulatorError;
use crate::instruction::{Instruction, Operand};
use crate::memory::{Lds, Memory};
use crate::register::ScalarRegisterFile;
use crate::wavefront::Export;

pub(crate) mod memory;
mod scalar;
mod vector;

/// Control-flow effects of one instruction.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Control {
    pub(crate) finished: bool,
    pub(crate) at_barrier: bool,
    pub(crate) branch_target: Option<u32>,
}

/// Execution context of one lane of one instruction.
pub(crate) struct Lane<'a> {
    pub(crate) id: u32,
    pub(crate) pc: u32,
    pub(crate) sregs: &'a mut ScalarRegisterFile,
    pub(crate) vregs: &'a mut [u32],
    pub(crate) control: &'a mut Control,
    pub(crate) exports: &'a mut Vec<Export>,
    pub(crate) global: &'a mut dyn Memory,
    pub(crate) lds: &'a mut Lds,
}

impl Lane<'_> {
    /// Reads vector register `index` of this lane.
    pub(crate) fn vreg(&self, index: u32) -> Result<u32, EmulatorError> {
        self.vregs
            .get(index as usize)
            .copied()
            .ok_or(EmulatorError::InvalidVectorRegister { index })
    }

    pub(crate) fn set_vreg(&mut self, index: u32, value: u32) -> Result<(), EmulatorError> {
        let slot = self
            .vregs
            .get_mut(index as usize)
            .ok_or(EmulatorError::InvalidVectorRegister { index })?;
        *slot = value;
        Ok(())
    }

    /// Reads an operand that must not be a vector register.
    pub(crate) fn scalar(&self, op: Operand, inst: &Instruction) -> Result<u32, EmulatorError> {
        match op {
            Operand::Sreg(index) => self.sregs.read(index),
            Operand::Literal(value) => Ok(value),
            Operand::Vreg(_) => Err(invalid_operand(inst)),
        }
    }

    /// Reads a 64-bit scalar operand. Inline integers sign-extend; literals zero-extend.
    pub(crate) fn scalar64(&self, op: Operand, inst: &Instruction) -> Result<u64, EmulatorError> {
        match op {
            Operand::Sreg(index @ sreg::INLINE_INT_FIRST..=sreg::INLINE_INT_LAST) => {
                let value = self.sregs.read(index)?;
                Ok(i64::from(value.cast_signed()).cast_unsigned())
            }
            Operand::Sreg(index) if sreg::inline_constant(index).is_some() => {
                Ok(u64::from(self.sregs.read(index)?))
            }
            Operand::Sreg(index) => self.sregs.read_pair(index),
            Operand::Literal(value) => Ok(u64::from(value)),
            Operand::Vreg(_) => Err(invalid_operand(inst)),
        }
    }

    /// Reads any source operand; vector registers come from this lane.
    pub(crate) fn src(&self, op: Operand, inst: &Instruction) -> Result<u32, EmulatorError> {
        match op {
            Operand::Vreg(index) => self.vreg(index),
            _ => self.scalar(op, inst),
        }
    }

    /// Reads this lane's bit of the mask in the SGPR pair at `sgpr`.
    pub(crate) fn mask_bit(&self, sgpr: u32) -> Result<bool, EmulatorError> {
        let mask = self.sregs.read_pair(sgpr)?;
        Ok(self.id < 64 && mask & (1 << self.id) != 0)
    }

    /// Reads this lane's bit of a mask operand (an SGPR pair, VCC or EXEC).
    pub(crate) fn mask_operand_bit(
        &self,
        op: Operand,
        inst: &Instruction,
    ) -> Result<bool, EmulatorError> {
        let mask = self.scalar64(op, inst)?;
        Ok(self.id < 64 && mask & (1 << self.id) != 0)
    }

    /// Sets or clears this lane's bit of the mask in the SGPR pair at `sgpr`.
    pub(crate) fn set_mask_bit(&mut self, sgpr: u32, bit: bool) -> Result<(), EmulatorError> {
        if self.id >= 64 {
            return Ok(());
        }
        let mut mask = self.sregs.read_pair(sgpr)?;
        if bit {
            mask |= 1 << self.id;
        } else {
            mask &= !(1 << self.id);
        }
        self.sregs.write_pair(sgpr, mask)
    }
}

/// Executes `inst` for one lane.
pub(crate) fn execute(inst: &Instruction, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    match inst {
        Instruction::Sop2(i) => scalar::sop2(i, inst, lane),
        Instruction::Sopk(i) => scalar::sopk(i, lane),
        Instruction::Sop1(i) => scalar::sop1(i, inst, lane),
        Instruction::Sopc(i) => scalar::sopc(i, inst, lane),
        Instruction::Sopp(i) => scalar::sopp(i, lane),
        Instruction::Smrd(i) => scalar::smrd(i, lane),
        Instruction::Vop2(i) => vector::vop2(i, inst, lane),
        Instruction::Vop1(i) => vector::vop1(i, inst, lane),
        Instruction::Vopc(i) => vector::vopc(i, inst, lane),
        Instruction::Vop3a(i) => vector::vop3a(i, inst, lane),
        Instruction::Vop3b(i) => vector::vop3b(i, inst, lane),
        Instruction::Vintrp(i) => vector::vintrp(i, lane),
        Instruction::Ds(i) => memory::ds(i, lane),
        Instruction::Mubuf(i) => memory::mubuf(i, inst, lane),
        Instruction::Mtbuf(i) => memory::mtbuf(i, inst, lane),
        Instruction::Mimg(i) => memory::mimg(i, lane),
        Instruction::Exp(i) => memory::exp(i, lane),
    }
}

pub(crate) fn unimplemented(format: Format, mnemonic: &'static str) -> EmulatorError {
    EmulatorError::UnimplementedOpcode { format, mnemonic }
}

pub(crate) fn invalid_operand(inst: &Instruction) -> EmulatorError {
    EmulatorError::InvalidOperand {
        mnemonic: inst.mnemonic(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! A single-lane harness for per-opcode tests.

    use super::*;
    use crate::memory::FlatMemory;
    use alloc::vec;

    pub(crate) struct Harness {
        pub(crate) sregs: ScalarRegisterFile,
        pub(crate) vregs: Vec<u32>,
        pub(crate) control: Control,
        pub(crate) exports: Vec<Export>,
        pub(crate) global: FlatMemory,
        pub(crate) lds: Lds,
        pub(crate) lane: u32,
        pub(crate) pc: u32,
    }

    impl Harness {
        pub(crate) fn new() -> Self {
            Self {
                sregs: ScalarRegisterFile::new(),
                vregs: vec![0; 16],
                control: Control::default(),
                exports: Vec::new(),
                global: FlatMemory::new(),
                lds: Lds::new(1024),
                lane: 0,
                pc: 0,
            }
        }

        pub(crate) fn run(&mut self, inst: impl Into<Instruction>) -> Result<(), EmulatorError> {
            let inst = inst.into();
            let mut lane = Lane {
                id: self.lane,
                pc: self.pc,
                sregs: &mut self.sregs,
                vregs: &mut self.vregs,
                control: &mut self.control,
                exports: &mut self.exports,
                global: &mut self.global,
                lds: &mut self.lds,
            };
            execute(&inst, &mut lane)
        }
    }
}
