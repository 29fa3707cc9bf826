// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use si_isa::{Format, SmrdOp, Sop1Op, Sop2Op, SopcOp, SopkOp, SoppOp, sreg};

use super::{Lane, unimplemented};
use crate::error::EmulatorError;
use crate::instruction::{Instruction, SmrdOffset, Smrd, Sop1, Sop2, Sopc, Sopk, Sopp};

pub(super) fn sop2(i: &Sop2, inst: &Instruction, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let wide = matches!(
        i.op,
        Sop2Op::SAndB64 | Sop2Op::SOrB64 | Sop2Op::SXorB64 | Sop2Op::SAndn2B64
    );
    if wide {
        let a = lane.scalar64(i.ssrc0, inst)?;
        let b = lane.scalar64(i.ssrc1, inst)?;
        let r = match i.op {
            Sop2Op::SAndB64 => a & b,
            Sop2Op::SOrB64 => a | b,
            Sop2Op::SXorB64 => a ^ b,
            _ => a & !b,
        };
        lane.sregs.write_pair(i.sdst, r)?;
        lane.sregs.set_scc(r != 0);
        return Ok(());
    }

    let a = lane.scalar(i.ssrc0, inst)?;
    let b = lane.scalar(i.ssrc1, inst)?;
    let (sa, sb) = (a.cast_signed(), b.cast_signed());
    let (r, scc) = match i.op {
        Sop2Op::SAddU32 => {
            let (r, carry) = a.overflowing_add(b);
            (r, Some(carry))
        }
        Sop2Op::SSubU32 => {
            let (r, borrow) = a.overflowing_sub(b);
            (r, Some(borrow))
        }
        Sop2Op::SAddI32 => {
            let (r, overflow) = sa.overflowing_add(sb);
            (r.cast_unsigned(), Some(overflow))
        }
        Sop2Op::SSubI32 => {
            let (r, overflow) = sa.overflowing_sub(sb);
            (r.cast_unsigned(), Some(overflow))
        }
        Sop2Op::SMinI32 => (sa.min(sb).cast_unsigned(), Some(sa < sb)),
        Sop2Op::SMinU32 => (a.min(b), Some(a < b)),
        Sop2Op::SMaxI32 => (sa.max(sb).cast_unsigned(), Some(sa > sb)),
        Sop2Op::SMaxU32 => (a.max(b), Some(a > b)),
        Sop2Op::SCselectB32 => (if lane.sregs.scc() { a } else { b }, None),
        Sop2Op::SAndB32 => nonzero(a & b),
        Sop2Op::SOrB32 => nonzero(a | b),
        Sop2Op::SXorB32 => nonzero(a ^ b),
        Sop2Op::SLshlB32 => nonzero(a << (b & 31)),
        Sop2Op::SLshrB32 => nonzero(a >> (b & 31)),
        Sop2Op::SAshrI32 => nonzero((sa >> (b & 31)).cast_unsigned()),
        Sop2Op::SMulI32 => (sa.wrapping_mul(sb).cast_unsigned(), None),
        Sop2Op::SAndB64 | Sop2Op::SOrB64 | Sop2Op::SXorB64 | Sop2Op::SAndn2B64 => {
            return Err(unimplemented(Format::Sop2, i.op.mnemonic()));
        }
    };
    lane.sregs.write(i.sdst, r)?;
    if let Some(scc) = scc {
        lane.sregs.set_scc(scc);
    }
    Ok(())
}

fn nonzero(r: u32) -> (u32, Option<bool>) {
    (r, Some(r != 0))
}

pub(super) fn sopk(i: &Sopk, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let imm = i32::from(i.simm16.cast_signed());
    match i.op {
        SopkOp::SMovkI32 => lane.sregs.write(i.sdst, imm.cast_unsigned()),
        SopkOp::SCmpkLeU32 => {
            let d = lane.sregs.read(i.sdst)?;
            lane.sregs.set_scc(d <= u32::from(i.simm16));
            Ok(())
        }
        SopkOp::SAddkI32 => {
            let d = lane.sregs.read(i.sdst)?.cast_signed();
            let (r, overflow) = d.overflowing_add(imm);
            lane.sregs.write(i.sdst, r.cast_unsigned())?;
            lane.sregs.set_scc(overflow);
            Ok(())
        }
        SopkOp::SMulkI32 => {
            let d = lane.sregs.read(i.sdst)?.cast_signed();
            lane.sregs.write(i.sdst, d.wrapping_mul(imm).cast_unsigned())
        }
    }
}

pub(super) fn sop1(i: &Sop1, inst: &Instruction, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    match i.op {
        Sop1Op::SMovB32 => {
            let v = lane.scalar(i.ssrc0, inst)?;
            lane.sregs.write(i.sdst, v)
        }
        Sop1Op::SMovB64 => {
            let v = lane.scalar64(i.ssrc0, inst)?;
            lane.sregs.write_pair(i.sdst, v)
        }
        Sop1Op::SNotB32 => {
            let v = !lane.scalar(i.ssrc0, inst)?;
            lane.sregs.write(i.sdst, v)?;
            lane.sregs.set_scc(v != 0);
            Ok(())
        }
        Sop1Op::SAndSaveexecB64 | Sop1Op::SOrSaveexecB64 => {
            let s = lane.scalar64(i.ssrc0, inst)?;
            let exec = lane.sregs.exec();
            lane.sregs.write_pair(i.sdst, exec)?;
            let next = if i.op == Sop1Op::SAndSaveexecB64 {
                s & exec
            } else {
                s | exec
            };
            lane.sregs.set_exec(next);
            lane.sregs.set_scc(next != 0);
            Ok(())
        }
        Sop1Op::SWqmB64 | Sop1Op::SSwappcB64 => Err(unimplemented(Format::Sop1, i.op.mnemonic())),
    }
}

pub(super) fn sopc(i: &Sopc, inst: &Instruction, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let a = lane.scalar(i.ssrc0, inst)?;
    let b = lane.scalar(i.ssrc1, inst)?;
    let (sa, sb) = (a.cast_signed(), b.cast_signed());
    let scc = match i.op {
        SopcOp::SCmpEqI32 => sa == sb,
        SopcOp::SCmpLgI32 => sa != sb,
        SopcOp::SCmpGtI32 => sa > sb,
        SopcOp::SCmpGeI32 => sa >= sb,
        SopcOp::SCmpLtI32 => sa < sb,
        SopcOp::SCmpLeI32 => sa <= sb,
        SopcOp::SCmpEqU32 => a == b,
        SopcOp::SCmpLgU32 => a != b,
        SopcOp::SCmpGtU32 => a > b,
        SopcOp::SCmpGeU32 => a >= b,
        SopcOp::SCmpLtU32 => a < b,
        SopcOp::SCmpLeU32 => a <= b,
    };
    lane.sregs.set_scc(scc);
    Ok(())
}

pub(super) fn sopp(i: &Sopp, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let taken = match i.op {
        SoppOp::SNop | SoppOp::SWaitcnt => return Ok(()),
        SoppOp::SEndpgm => {
            lane.control.finished = true;
            return Ok(());
        }
        SoppOp::SBarrier => {
            lane.control.at_barrier = true;
            return Ok(());
        }
        SoppOp::SBranch => true,
        SoppOp::SCbranchScc0 => !lane.sregs.scc(),
        SoppOp::SCbranchScc1 => lane.sregs.scc(),
        SoppOp::SCbranchVccz => lane.sregs.read(sreg::VCCZ)? != 0,
        SoppOp::SCbranchVccnz => lane.sregs.read(sreg::VCCZ)? == 0,
        SoppOp::SCbranchExecz => lane.sregs.read(sreg::EXECZ)? != 0,
        SoppOp::SCbranchExecnz => lane.sregs.read(sreg::EXECZ)? == 0,
    };
    if taken {
        let offset = i64::from(i.simm16.cast_signed()) * 4;
        let target = i64::from(lane.pc) + offset + 4;
        let target = u32::try_from(target).map_err(|_| EmulatorError::BadPc { pc: lane.pc })?;
        lane.control.branch_target = Some(target);
    }
    Ok(())
}

/// 48-bit base address of a buffer descriptor starting at `sgpr`.
pub(super) fn buffer_base(lane: &Lane<'_>, sgpr: u32) -> Result<u64, EmulatorError> {
    let lo = lane.sregs.read(sgpr)?;
    let hi = lane.sregs.read(sgpr + 1)?;
    Ok(u64::from(lo) | (u64::from(hi & 0xFFFF) << 32))
}

pub(super) fn smrd(i: &Smrd, lane: &mut Lane<'_>) -> Result<(), EmulatorError> {
    let offset = match i.offset {
        SmrdOffset::Imm(dwords) => u64::from(dwords) * 4,
        SmrdOffset::Sgpr(s) => u64::from(lane.sregs.read(s)?),
    };
    let (base, count) = match i.op {
        SmrdOp::SLoadDword => (lane.sregs.read_pair(i.sbase)?, 1),
        SmrdOp::SLoadDwordx2 => (lane.sregs.read_pair(i.sbase)?, 2),
        SmrdOp::SLoadDwordx4 => (lane.sregs.read_pair(i.sbase)?, 4),
        SmrdOp::SBufferLoadDword => (buffer_base(lane, i.sbase)?, 1),
        SmrdOp::SBufferLoadDwordx2 => (buffer_base(lane, i.sbase)?, 2),
        SmrdOp::SBufferLoadDwordx4 => (buffer_base(lane, i.sbase)?, 4),
    };
    let address = base.wrapping_add(offset);
    for k in 0..count {
        let value = lane.global.read_u32(address.wrapping_add(u64::from(k) * 4))?;
        lane.sregs.write(i.sdst + k, value)?;
    }
    Ok(())
}
