// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compiler-side view of a kernel: functions, basic blocks, instructions and their arguments.
//!
//! Register ids are symbolic (pre-allocation). A [`Function`] declares how many registers of each
//! class it uses, and every argument pushed into it is checked against that count, so the
//! analyses can index bit sets without further validation.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::ops::RangeInclusive;

use si_isa::{Opcode, RegClass};

use crate::error::CfgError;

/// Identifier for a basic block within a [`Function`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BlockId(u32);

impl BlockId {
    /// Creates a new block id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the block's position in its function.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether an instruction reads or writes a register argument.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Read by the instruction.
    Source,
    /// Written by the instruction.
    Destination,
}

/// One instruction argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Argument {
    /// A single symbolic register.
    Register {
        /// Register class.
        class: RegClass,
        /// Register id.
        id: u32,
        /// Read or written.
        direction: Direction,
    },
    /// A contiguous run of registers holding one wide value (`s[4:7]`).
    RegisterSeries {
        /// Register class.
        class: RegClass,
        /// First register.
        low: u32,
        /// Last register (inclusive).
        high: u32,
        /// Read or written.
        direction: Direction,
    },
    /// An immediate value.
    Literal(u32),
    /// A hardware register or status bit such as `vcc` or `exec`, named by its scalar index.
    Special(u32),
    /// A branch target.
    Label(BlockId),
}

impl Argument {
    /// Vector register destination.
    #[must_use]
    pub const fn vdst(id: u32) -> Self {
        Self::reg(RegClass::Vector, id, Direction::Destination)
    }

    /// Vector register source.
    #[must_use]
    pub const fn vsrc(id: u32) -> Self {
        Self::reg(RegClass::Vector, id, Direction::Source)
    }

    /// Scalar register destination.
    #[must_use]
    pub const fn sdst(id: u32) -> Self {
        Self::reg(RegClass::Scalar, id, Direction::Destination)
    }

    /// Scalar register source.
    #[must_use]
    pub const fn ssrc(id: u32) -> Self {
        Self::reg(RegClass::Scalar, id, Direction::Source)
    }

    /// A single register.
    #[must_use]
    pub const fn reg(class: RegClass, id: u32, direction: Direction) -> Self {
        Self::Register {
            class,
            id,
            direction,
        }
    }

    /// A register series `low..=high`.
    #[must_use]
    pub const fn series(class: RegClass, low: u32, high: u32, direction: Direction) -> Self {
        Self::RegisterSeries {
            class,
            low,
            high,
            direction,
        }
    }

    /// Returns the class, direction and covered registers of a register argument.
    #[must_use]
    pub fn registers(&self) -> Option<(RegClass, Direction, RangeInclusive<u32>)> {
        match *self {
            Self::Register {
                class,
                id,
                direction,
            } => Some((class, direction, id..=id)),
            Self::RegisterSeries {
                class,
                low,
                high,
                direction,
            } => Some((class, direction, low..=high)),
            Self::Literal(_) | Self::Special(_) | Self::Label(_) => None,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Register { class, id, .. } => write!(f, "{}{id}", class.prefix()),
            Self::RegisterSeries {
                class, low, high, ..
            } => write!(f, "{}[{low}:{high}]", class.prefix()),
            Self::Literal(value) => write!(f, "{value:#x}"),
            Self::Special(index) => match index {
                si_isa::sreg::VCC_LO => f.write_str("vcc"),
                si_isa::sreg::EXEC_LO => f.write_str("exec"),
                si_isa::sreg::M0 => f.write_str("m0"),
                si_isa::sreg::SCC => f.write_str("scc"),
                _ => write!(f, "special{index}"),
            },
            Self::Label(block) => write!(f, "bb{}", block.index()),
        }
    }
}

/// An instruction with symbolic register arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    opcode: Opcode,
    args: Vec<Argument>,
}

impl Instruction {
    /// Creates an instruction.
    #[must_use]
    pub fn new(opcode: impl Into<Opcode>, args: impl Into<Vec<Argument>>) -> Self {
        Self {
            opcode: opcode.into(),
            args: args.into(),
        }
    }

    /// Creates a `PHI` merging `sources` into `dst`.
    #[must_use]
    pub fn phi(dst: Argument, sources: impl IntoIterator<Item = Argument>) -> Self {
        let mut args = Vec::from([dst]);
        args.extend(sources);
        Self {
            opcode: Opcode::Phi,
            args,
        }
    }

    /// The opcode.
    #[must_use]
    #[inline]
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// The arguments in assembler order.
    #[must_use]
    #[inline]
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Registers of `class` accessed in `direction`, with series expanded.
    pub fn registers(
        &self,
        class: RegClass,
        direction: Direction,
    ) -> impl Iterator<Item = u32> + '_ {
        self.args
            .iter()
            .filter_map(Argument::registers)
            .filter(move |(c, d, _)| *c == class && *d == direction)
            .flat_map(|(_, _, range)| range)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        for (i, arg) in self.args.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{arg}")?;
        }
        Ok(())
    }
}

/// A straight-line run of instructions with explicit control-flow edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicBlock {
    id: BlockId,
    name: Box<str>,
    instructions: Vec<Instruction>,
    preds: Vec<BlockId>,
    succs: Vec<BlockId>,
}

impl BasicBlock {
    /// This block's id.
    #[must_use]
    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Label used in dumps.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instructions in program order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Predecessor blocks.
    #[must_use]
    pub fn preds(&self) -> &[BlockId] {
        &self.preds
    }

    /// Successor blocks.
    #[must_use]
    pub fn succs(&self) -> &[BlockId] {
        &self.succs
    }
}

/// A kernel function: basic blocks in layout order plus register-class sizes.
///
/// The first block added is the entry block. Edges are kept mutually consistent: adding `a -> b`
/// records `b` as a successor of `a` and `a` as a predecessor of `b`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    name: Box<str>,
    num_vregs: u32,
    num_sregs: u32,
    blocks: Vec<BasicBlock>,
    live_out_vector: Vec<u32>,
    live_out_scalar: Vec<u32>,
}

impl Function {
    /// Creates an empty function using `num_vregs` vector and `num_sregs` scalar registers.
    #[must_use]
    pub fn new(name: impl Into<Box<str>>, num_vregs: u32, num_sregs: u32) -> Self {
        Self {
            name: name.into(),
            num_vregs,
            num_sregs,
            blocks: Vec::new(),
            live_out_vector: Vec::new(),
            live_out_scalar: Vec::new(),
        }
    }

    /// Function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared register count of `class`.
    #[must_use]
    pub fn register_count(&self, class: RegClass) -> u32 {
        match class {
            RegClass::Vector => self.num_vregs,
            RegClass::Scalar => self.num_sregs,
        }
    }

    /// Appends a block and returns its id.
    pub fn add_block(&mut self, name: impl Into<Box<str>>) -> BlockId {
        let id = BlockId(u32::try_from(self.blocks.len()).unwrap_or(u32::MAX));
        self.blocks.push(BasicBlock {
            id,
            name: name.into(),
            instructions: Vec::new(),
            preds: Vec::new(),
            succs: Vec::new(),
        });
        id
    }

    /// Appends `inst` to `block` after checking its register arguments.
    pub fn push(&mut self, block: BlockId, inst: Instruction) -> Result<(), CfgError> {
        for arg in inst.args() {
            if let Argument::RegisterSeries {
                class, low, high, ..
            } = *arg
                && low > high
            {
                return Err(CfgError::EmptySeries { class, low, high });
            }
            if let Some((class, _, range)) = arg.registers() {
                self.check_register(class, *range.end())?;
            }
        }
        self.block_mut(block)?.instructions.push(inst);
        Ok(())
    }

    /// Adds the control-flow edge `from -> to`. Adding an existing edge is a no-op.
    pub fn add_edge(&mut self, from: BlockId, to: BlockId) -> Result<(), CfgError> {
        self.block_mut(to)?;
        let src = self.block_mut(from)?;
        if src.succs.contains(&to) {
            return Ok(());
        }
        src.succs.push(to);
        self.block_mut(to)?.preds.push(from);
        Ok(())
    }

    /// Declares registers of `class` that are live when the function exits.
    ///
    /// They seed the live-out set of every block without successors.
    pub fn set_live_out(
        &mut self,
        class: RegClass,
        regs: impl IntoIterator<Item = u32>,
    ) -> Result<(), CfgError> {
        let regs: Vec<u32> = regs.into_iter().collect();
        for &r in &regs {
            self.check_register(class, r)?;
        }
        match class {
            RegClass::Vector => self.live_out_vector = regs,
            RegClass::Scalar => self.live_out_scalar = regs,
        }
        Ok(())
    }

    /// Registers of `class` live at function exit.
    #[must_use]
    pub fn live_out(&self, class: RegClass) -> &[u32] {
        match class {
            RegClass::Vector => &self.live_out_vector,
            RegClass::Scalar => &self.live_out_scalar,
        }
    }

    /// Blocks in layout order.
    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Looks up a block.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    /// The entry block, if the function has any blocks.
    #[must_use]
    pub fn entry(&self) -> Option<BlockId> {
        self.blocks.first().map(BasicBlock::id)
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut BasicBlock, CfgError> {
        self.blocks
            .get_mut(id.index())
            .ok_or(CfgError::BadBlockId { block: id })
    }

    fn check_register(&self, class: RegClass, id: u32) -> Result<(), CfgError> {
        let count = self.register_count(class);
        if id >= count {
            return Err(CfgError::RegisterOutOfRange { class, id, count });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use si_isa::{Sop1Op, Vop2Op};
    use std::string::ToString;
    use std::vec;
    use std::vec::Vec;

    #[test]
    fn edges_are_recorded_on_both_ends_once() {
        let mut f = Function::new("k", 4, 4);
        let a = f.add_block("a");
        let b = f.add_block("b");
        f.add_edge(a, b).unwrap();
        f.add_edge(a, b).unwrap();
        assert_eq!(f.block(a).unwrap().succs(), [b]);
        assert_eq!(f.block(b).unwrap().preds(), [a]);
        assert_eq!(
            f.add_edge(a, BlockId::new(7)),
            Err(CfgError::BadBlockId {
                block: BlockId::new(7)
            })
        );
    }

    #[test]
    fn push_rejects_registers_past_the_declared_count() {
        let mut f = Function::new("k", 4, 2);
        let b = f.add_block("entry");
        let bad = Instruction::new(
            Sop1Op::SMovB64,
            vec![
                Argument::series(RegClass::Scalar, 0, 2, Direction::Destination),
                Argument::Literal(0),
            ],
        );
        assert_eq!(
            f.push(b, bad),
            Err(CfgError::RegisterOutOfRange {
                class: RegClass::Scalar,
                id: 2,
                count: 2
            })
        );
        assert!(f.block(b).unwrap().instructions().is_empty());
    }

    #[test]
    fn series_expand_per_direction() {
        let inst = Instruction::new(
            Vop2Op::VAddI32,
            vec![
                Argument::vdst(3),
                Argument::series(RegClass::Vector, 0, 1, Direction::Source),
                Argument::ssrc(5),
            ],
        );
        let defs: Vec<u32> = inst.registers(RegClass::Vector, Direction::Destination).collect();
        let uses: Vec<u32> = inst.registers(RegClass::Vector, Direction::Source).collect();
        assert_eq!(defs, [3]);
        assert_eq!(uses, [0, 1]);
        assert_eq!(inst.to_string(), "v_add_i32 v3, v[0:1], s5");
    }
}
