// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Kernel instruction memory and a small assembler with label fix-ups.

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashMap;
use si_isa::SoppOp;

use crate::error::KernelError;
use crate::instruction::{Instruction, Sopp};

/// An assembled kernel: decoded instructions at byte offsets from the entry point (offset 0).
#[derive(Clone, Debug)]
pub struct Kernel {
    name: Box<str>,
    instructions: Vec<(u32, Instruction)>,
    by_offset: HashMap<u32, usize>,
    labels: HashMap<Box<str>, u32>,
    size: u32,
}

impl Kernel {
    /// Kernel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total encoded size in bytes.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the instruction starting at byte offset `pc`.
    #[must_use]
    pub fn fetch(&self, pc: u32) -> Option<&Instruction> {
        let index = *self.by_offset.get(&pc)?;
        Some(&self.instructions[index].1)
    }

    /// Byte offset of a label.
    #[must_use]
    pub fn label_offset(&self, label: &str) -> Option<u32> {
        self.labels.get(label).copied()
    }

    /// Instructions with their byte offsets, in program order.
    pub fn instructions(&self) -> impl Iterator<Item = (u32, &Instruction)> + '_ {
        self.instructions.iter().map(|(pc, inst)| (*pc, inst))
    }
}

/// Assembles a [`Kernel`] from decoded instructions.
#[derive(Clone, Debug)]
pub struct KernelBuilder {
    name: Box<str>,
    instructions: Vec<(u32, Instruction)>,
    labels: HashMap<Box<str>, u32>,
    fixups: Vec<(usize, Box<str>)>,
    offset: u32,
}

impl KernelBuilder {
    /// Starts an empty kernel.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            instructions: Vec::new(),
            labels: HashMap::new(),
            fixups: Vec::new(),
            offset: 0,
        }
    }

    /// Appends an instruction and returns its byte offset.
    pub fn push(&mut self, inst: impl Into<Instruction>) -> u32 {
        let inst = inst.into();
        let at = self.offset;
        self.offset += inst.size();
        self.instructions.push((at, inst));
        at
    }

    /// Binds `label` to the offset of the next instruction.
    pub fn label(&mut self, label: &str) -> Result<(), KernelError> {
        if self.labels.contains_key(label) {
            return Err(KernelError::DuplicateLabel {
                label: label.into(),
            });
        }
        self.labels.insert(label.into(), self.offset);
        Ok(())
    }

    /// Appends a branch to `label`, resolved when the kernel is built.
    pub fn branch(&mut self, op: SoppOp, label: &str) -> u32 {
        self.fixups.push((self.instructions.len(), label.into()));
        self.push(Sopp { op, simm16: 0 })
    }

    /// Resolves branch targets.
    pub fn build(mut self) -> Result<Kernel, KernelError> {
        for (index, label) in &self.fixups {
            let Some(&target) = self.labels.get(label) else {
                return Err(KernelError::UnknownLabel {
                    label: label.clone(),
                });
            };
            let (at, inst) = &mut self.instructions[*index];
            let distance = (i64::from(target) - i64::from(*at) - 4) / 4;
            let simm16 = i16::try_from(distance).map_err(|_| KernelError::BranchOutOfRange {
                label: label.clone(),
            })?;
            if let Instruction::Sopp(sopp) = inst {
                sopp.simm16 = simm16.cast_unsigned();
            }
        }
        let by_offset = self
            .instructions
            .iter()
            .enumerate()
            .map(|(index, (at, _))| (*at, index))
            .collect();
        Ok(Kernel {
            name: self.name,
            instructions: self.instructions,
            by_offset,
            labels: self.labels,
            size: self.offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Operand, Sop2};
    use si_isa::Sop2Op;

    fn add() -> Sop2 {
        Sop2 {
            op: Sop2Op::SAddU32,
            sdst: 0,
            ssrc0: Operand::Sreg(0),
            ssrc1: Operand::int(1),
        }
    }

    #[test]
    fn offsets_accumulate_sizes() {
        let mut b = KernelBuilder::new("k");
        assert_eq!(b.push(add()), 0);
        assert_eq!(
            b.push(Sop2 {
                ssrc1: Operand::Literal(1000),
                ..add()
            }),
            4
        );
        assert_eq!(b.push(add()), 12);
        let k = b.build().unwrap();
        assert_eq!(k.size(), 16);
        assert!(k.fetch(8).is_none(), "literal bytes are not an instruction");
        assert!(k.fetch(12).is_some(), "third instruction starts after the literal");
    }

    #[test]
    fn branches_encode_dword_distance() {
        let mut b = KernelBuilder::new("loop");
        b.label("top").unwrap();
        b.push(add());
        let back = b.branch(SoppOp::SBranch, "top");
        let fwd = b.branch(SoppOp::SCbranchScc0, "end");
        b.push(add());
        b.label("end").unwrap();
        b.push(Sopp {
            op: SoppOp::SEndpgm,
            simm16: 0,
        });
        let k = b.build().unwrap();
        let Some(Instruction::Sopp(s)) = k.fetch(back) else {
            panic!("branch missing");
        };
        assert_eq!(s.simm16.cast_signed(), -2);
        let Some(Instruction::Sopp(s)) = k.fetch(fwd) else {
            panic!("branch missing");
        };
        assert_eq!(s.simm16, 1);
        assert_eq!(k.label_offset("end"), Some(16));
    }

    #[test]
    fn label_errors() {
        let mut b = KernelBuilder::new("k");
        b.label("a").unwrap();
        assert_eq!(
            b.label("a"),
            Err(KernelError::DuplicateLabel { label: "a".into() })
        );
        b.branch(SoppOp::SBranch, "nowhere");
        assert_eq!(
            b.build().unwrap_err(),
            KernelError::UnknownLabel {
                label: "nowhere".into()
            }
        );
    }
}
