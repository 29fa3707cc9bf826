// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memory access classification and the LDS, buffer, image and export formats.

use si_isa::{DsOp, Format, MimgOp, MubufOp, SoppOp};

use super::scalar::buffer_base;
use super::{Lane, unimplemented};
use crate::error::EmulatorError;
use crate::instruction::{Ds, Exp, Instruction, Mimg, Mtbuf, Mubuf, Operand};
use crate::memory::Memory;
use crate::stats::AccessFlags;
use crate::wavefront::Export;

/// Classifies the memory behavior of `inst`.
///
/// Every LDS, buffer and image opcode must fall in a known read or write range; anything else is
/// an error so that a new opcode cannot silently skip the memory-timing model.
pub(crate) fn classify(inst: &Instruction) -> Result<AccessFlags, EmulatorError> {
    let unclassified = |format, op| Err(EmulatorError::UnclassifiedMemoryOpcode { format, op });
    Ok(match inst {
        Instruction::Ds(i) => match i.op.code() {
            13..16 | 30..32 | 77..80 => AccessFlags::LDS_WRITE,
            54..61 | 118..120 => AccessFlags::LDS_READ,
            op => return unclassified(Format::Ds, op),
        },
        Instruction::Mtbuf(i) => match i.op.code() {
            0..4 => AccessFlags::VECTOR_MEM_READ,
            4..8 => AccessFlags::VECTOR_MEM_WRITE,
            op => return unclassified(Format::Mtbuf, op),
        },
        Instruction::Mubuf(i) => match i.op.code() {
            0..4 | 8..15 => AccessFlags::VECTOR_MEM_READ,
            4..8 | 24..30 => AccessFlags::VECTOR_MEM_WRITE,
            50 => AccessFlags::VECTOR_MEM_ATOMIC,
            op => return unclassified(Format::Mubuf, op),
        },
        Instruction::Mimg(i) => match i.op.code() {
            0..8 => AccessFlags::VECTOR_MEM_READ,
            8..16 => AccessFlags::VECTOR_MEM_WRITE,
            op => return unclassified(Format::Mimg, op),
        },
        Instruction::Smrd(_) => AccessFlags::SCALAR_MEM_READ,
        Instruction::Sopp(i) if i.op == SoppOp::SWaitcnt => AccessFlags::MEM_WAIT,
        Instruction::Sopp(i) if i.op == SoppOp::SBarrier => AccessFlags::BARRIER,
        _ => AccessFlags::NONE,
    })
}

fn read_sized(mem: &dyn Memory, address: u64, size: usize) -> Result<u32, EmulatorError> {
    let mut buf = [0_u8; 4];
    mem.read(address, &mut buf[..size])?;
    Ok(u32::from_le_bytes(buf))
}

fn write_sized(
    mem: &mut dyn Memory,
    address: u64,
    value: u32,
    size: usize,
) -> Result<(), EmulatorError> {
    mem.write(address, &value.to_le_bytes()[..size])?;
    Ok(())
}

fn sign_extend(value: u32, bits: u32) -> u32 {
    let shift = 32 - bits;
    ((value << shift).cast_signed() >> shift).cast_unsigned()
}

pub(super) fn ds(i: &Ds, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let addr = u64::from(lane.vreg(i.addr)?);
    let offset = u64::from(i.offset0) | (u64::from(i.offset1) << 8);
    let at = addr + offset;
    let pair = |scale: u64| (addr + u64::from(i.offset0) * scale, addr + u64::from(i.offset1) * scale);
    match i.op {
        DsOp::DsWriteB32 | DsOp::DsWriteB16 | DsOp::DsWriteB8 => {
            let size = match i.op {
                DsOp::DsWriteB32 => 4,
                DsOp::DsWriteB16 => 2,
                _ => 1,
            };
            let v = lane.vreg(i.data0)?;
            write_sized(lane.lds, at, v, size)
        }
        DsOp::DsWriteB64 => {
            let lo = lane.vreg(i.data0)?;
            let hi = lane.vreg(i.data0 + 1)?;
            write_sized(lane.lds, at, lo, 4)?;
            write_sized(lane.lds, at + 4, hi, 4)
        }
        DsOp::DsWrite2B32 | DsOp::DsWrite2st64B32 => {
            let scale = if i.op == DsOp::DsWrite2B32 { 4 } else { 256 };
            let (a0, a1) = pair(scale);
            let v0 = lane.vreg(i.data0)?;
            let v1 = lane.vreg(i.data1)?;
            write_sized(lane.lds, a0, v0, 4)?;
            write_sized(lane.lds, a1, v1, 4)
        }
        DsOp::DsReadB32 => {
            let v = read_sized(lane.lds, at, 4)?;
            lane.set_vreg(i.vdst, v)
        }
        DsOp::DsReadU8 | DsOp::DsReadI8 => {
            let v = read_sized(lane.lds, at, 1)?;
            let v = if i.op == DsOp::DsReadI8 { sign_extend(v, 8) } else { v };
            lane.set_vreg(i.vdst, v)
        }
        DsOp::DsReadU16 | DsOp::DsReadI16 => {
            let v = read_sized(lane.lds, at, 2)?;
            let v = if i.op == DsOp::DsReadI16 { sign_extend(v, 16) } else { v };
            lane.set_vreg(i.vdst, v)
        }
        DsOp::DsReadB64 => {
            let lo = read_sized(lane.lds, at, 4)?;
            let hi = read_sized(lane.lds, at + 4, 4)?;
            lane.set_vreg(i.vdst, lo)?;
            lane.set_vreg(i.vdst + 1, hi)
        }
        DsOp::DsRead2B32 | DsOp::DsRead2st64B32 => {
            let scale = if i.op == DsOp::DsRead2B32 { 4 } else { 256 };
            let (a0, a1) = pair(scale);
            let v0 = read_sized(lane.lds, a0, 4)?;
            let v1 = read_sized(lane.lds, a1, 4)?;
            lane.set_vreg(i.vdst, v0)?;
            lane.set_vreg(i.vdst + 1, v1)
        }
        DsOp::DsAddU32 => Err(unimplemented(Format::Ds, i.op.mnemonic())),
    }
}

/// Address of a buffer access: descriptor base, scalar and immediate offsets, the per-lane
/// offset and the record index scaled by the descriptor stride.
fn buffer_address(
    lane: &Lane<'_>,
    inst: &Instruction,
    srsrc: u32,
    vaddr: u32,
    soffset: Operand,
    offset: u16,
    offen: bool,
    idxen: bool,
) -> Result<u64, EmulatorError> {
    let base = buffer_base(lane, srsrc)?;
    let stride = u64::from((lane.sregs.read(srsrc + 1)? >> 16) & 0x3FFF);
    let index = if idxen {
        u64::from(lane.vreg(vaddr)?)
    } else {
        0
    };
    let lane_offset = if offen {
        u64::from(lane.vreg(if idxen { vaddr + 1 } else { vaddr })?)
    } else {
        0
    };
    let soffset = u64::from(lane.scalar(soffset, inst)?);
    Ok(base
        .wrapping_add(soffset)
        .wrapping_add(u64::from(offset))
        .wrapping_add(lane_offset)
        .wrapping_add(index * stride))
}

pub(super) fn mubuf(i: &Mubuf, inst: &Instruction, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let at = buffer_address(
        lane, inst, i.srsrc, i.vaddr, i.soffset, i.offset, i.offen, i.idxen,
    )?;
    let load = |lane: &mut Lane<'_>, size: usize, signed: bool| -> Result<(), EmulatorError> {
        let v = read_sized(lane.global, at, size)?;
        let v = if signed {
            sign_extend(v, 8 * u32::try_from(size).unwrap_or(4))
        } else {
            v
        };
        lane.set_vreg(i.vdata, v)
    };
    match i.op {
        MubufOp::BufferLoadFormatX | MubufOp::BufferLoadDword => load(lane, 4, false),
        MubufOp::BufferLoadUbyte => load(lane, 1, false),
        MubufOp::BufferLoadSbyte => load(lane, 1, true),
        MubufOp::BufferLoadUshort => load(lane, 2, false),
        MubufOp::BufferLoadSshort => load(lane, 2, true),
        MubufOp::BufferStoreFormatX
        | MubufOp::BufferStoreDword
        | MubufOp::BufferStoreShort
        | MubufOp::BufferStoreByte => {
            let size = match i.op {
                MubufOp::BufferStoreByte => 1,
                MubufOp::BufferStoreShort => 2,
                _ => 4,
            };
            let v = lane.vreg(i.vdata)?;
            write_sized(lane.global, at, v, size)
        }
        MubufOp::BufferAtomicAdd => {
            let old = lane.global.read_u32(at)?;
            let add = lane.vreg(i.vdata)?;
            lane.global.write_u32(at, old.wrapping_add(add))?;
            if i.glc {
                lane.set_vreg(i.vdata, old)?;
            }
            Ok(())
        }
        MubufOp::BufferAtomicSwap => Err(unimplemented(Format::Mubuf, i.op.mnemonic())),
    }
}

pub(super) fn mtbuf(i: &Mtbuf, inst: &Instruction, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let at = buffer_address(
        lane, inst, i.srsrc, i.vaddr, i.soffset, i.offset, i.offen, i.idxen,
    )?;
    let store = i.op.code() >= 4;
    for k in 0..i.op.components() {
        let address = at.wrapping_add(u64::from(k) * 4);
        if store {
            let v = lane.vreg(i.vdata + k)?;
            lane.global.write_u32(address, v)?;
        } else {
            let v = lane.global.read_u32(address)?;
            lane.set_vreg(i.vdata + k, v)?;
        }
    }
    Ok(())
}

pub(super) fn mimg(i: &Mimg, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let base = buffer_base(lane, i.srsrc)?;
    let x = u64::from(lane.vreg(i.vaddr)?);
    let at = base.wrapping_add(x * 4);
    match i.op {
        MimgOp::ImageLoad => {
            let v = lane.global.read_u32(at)?;
            lane.set_vreg(i.vdata, v)
        }
        MimgOp::ImageStore => {
            let v = lane.vreg(i.vdata)?;
            lane.global.write_u32(at, v)?;
            Ok(())
        }
        MimgOp::ImageSample => Err(unimplemented(Format::Mimg, i.op.mnemonic())),
    }
}

pub(super) fn exp(i: &Exp, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let mut values = [0; 4];
    for (k, (slot, &reg)) in values.iter_mut().zip(&i.vsrc).enumerate() {
        if i.en & (1 << k) != 0 {
            *slot = lane.vreg(reg)?;
        }
    }
    lane.exports.push(Export {
        target: i.target,
        lane: lane.id,
        enabled: i.en & 0xF,
        values,
        done: i.done,
    });
    Ok(())
}
