// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Active-mask handling of the wavefront engine and whole-kernel runs through the NDRange driver.

use si_conformance::{Bench, patterned_wavefront};
use si_emulator::{
    Emulator, EmulatorConfig, Exp, FlatMemory, KernelBuilder, Mubuf, NdRange, Operand,
    ScalarRegisterFile, Sop1, Sop2, Sopc, Sopp, Vop1, Vop2, Vop3a, Vopc,
};
use si_isa::sreg::{EXEC_HI, EXEC_LO, VCC_LO};
use si_isa::{MubufOp, Sop1Op, Sop2Op, SopcOp, SoppOp, Vop1Op, Vop2Op, Vop3Op, VopcOp};

fn endpgm() -> Sopp {
    Sopp {
        op: SoppOp::SEndpgm,
        simm16: 0,
    }
}

#[test]
fn exec_halves_map_to_lanes() {
    let mut sregs = ScalarRegisterFile::new();
    sregs.write(EXEC_LO, 1 << 31).unwrap();
    assert!(sregs.is_lane_active(31), "EXEC_LO bit 31 is lane 31");
    assert!(!sregs.is_lane_active(63), "EXEC_LO bit 31 is not lane 63");

    sregs.write(EXEC_LO, 0).unwrap();
    sregs.write(EXEC_HI, 1).unwrap();
    assert!(sregs.is_lane_active(32), "EXEC_HI bit 0 is lane 32");
    assert!(!sregs.is_lane_active(0), "EXEC_HI bit 0 is not lane 0");

    sregs.write(EXEC_HI, 1 << 31).unwrap();
    let active: Vec<u32> = (0..64).filter(|&l| sregs.is_lane_active(l)).collect();
    assert_eq!(active, [63]);
    assert_eq!(sregs.exec(), 1 << 63);
}

#[test]
fn scalar_instruction_runs_once_with_empty_exec() {
    let mut b = KernelBuilder::new("scalar");
    b.push(Sop2 {
        op: Sop2Op::SAddU32,
        sdst: 0,
        ssrc0: Operand::Sreg(1),
        ssrc1: Operand::Sreg(2),
    });
    b.push(endpgm());
    let kernel = b.build().unwrap();

    let mut wf = patterned_wavefront(4);
    wf.sregs_mut().set_exec(0);
    wf.sregs_mut().write(1, 40).unwrap();
    wf.sregs_mut().write(2, 2).unwrap();
    let vregs_before = wf.vregs().clone();

    let mut bench = Bench::default();
    bench.step(&mut wf, &kernel).unwrap();
    assert_eq!(wf.sregs().read(0), Ok(42));
    assert_eq!(wf.counters().total, 1);
    assert_eq!(wf.counters().scalar_alu, 1);
    assert_eq!(wf.pc(), 4);
    assert_eq!(wf.vregs(), &vregs_before, "vector state untouched");
}

#[test]
fn vector_instruction_touches_only_active_lanes() {
    let mut b = KernelBuilder::new("vector");
    b.push(Vop2 {
        op: Vop2Op::VAddI32,
        vdst: 3,
        src0: Operand::Vreg(1),
        vsrc1: 2,
    });
    b.push(endpgm());
    let kernel = b.build().unwrap();

    let mut wf = patterned_wavefront(4);
    wf.sregs_mut().set_exec((1 << 0) | (1 << 5));
    let before = wf.vregs().clone();

    let mut bench = Bench::default();
    bench.step(&mut wf, &kernel).unwrap();
    for lane in 0..64 {
        if lane == 0 || lane == 5 {
            let expected = (lane * 1000 + 1) + (lane * 1000 + 2);
            assert_eq!(wf.vregs().get(lane, 3), Ok(expected), "lane {lane}");
            assert_eq!(wf.vregs().lane(lane)[..3], before.lane(lane)[..3], "sources kept");
        } else {
            assert_eq!(wf.vregs().lane(lane), before.lane(lane), "lane {lane} unchanged");
        }
    }
    assert_eq!(wf.counters().vector_alu, 1);
}

#[test]
fn scalar_loop_accumulates_per_lane() {
    // out[gid] = sum over i in 0..4 of (gid + i)
    let mut b = KernelBuilder::new("loop_sum");
    b.push(Vop3a::new(
        Vop3Op::VMadU32U24,
        1,
        [Operand::Sreg(4), Operand::int(64), Operand::Vreg(0)],
    ));
    b.push(Vop1 {
        op: Vop1Op::VMovB32,
        vdst: 2,
        src0: Operand::ZERO,
    });
    b.push(Sop1 {
        op: Sop1Op::SMovB32,
        sdst: 5,
        ssrc0: Operand::ZERO,
    });
    b.label("loop").unwrap();
    b.push(Vop2 {
        op: Vop2Op::VAddI32,
        vdst: 2,
        src0: Operand::Vreg(1),
        vsrc1: 2,
    });
    b.push(Vop2 {
        op: Vop2Op::VAddI32,
        vdst: 2,
        src0: Operand::Sreg(5),
        vsrc1: 2,
    });
    b.push(Sop2 {
        op: Sop2Op::SAddU32,
        sdst: 5,
        ssrc0: Operand::Sreg(5),
        ssrc1: Operand::int(1),
    });
    b.push(Sopc {
        op: SopcOp::SCmpLtU32,
        ssrc0: Operand::Sreg(5),
        ssrc1: Operand::int(4),
    });
    b.branch(SoppOp::SCbranchScc1, "loop");
    b.push(Vop2 {
        op: Vop2Op::VLshlrevB32,
        vdst: 3,
        src0: Operand::int(2),
        vsrc1: 1,
    });
    let mut store = Mubuf::new(MubufOp::BufferStoreDword, 2, 3, 0);
    store.offen = true;
    b.push(store);
    b.push(Exp {
        target: 0,
        en: 0b0001,
        vsrc: [2, 0, 0, 0],
        done: true,
    });
    b.push(endpgm());
    let kernel = b.build().unwrap();

    let mut emu = Emulator::new(EmulatorConfig::default(), FlatMemory::new()).unwrap();
    let summary = emu
        .run(&kernel, &NdRange::linear(128, 64, vec![0x4000, 0, 0, 0]), None)
        .unwrap();
    let out = emu.memory().read_words(0x4000, 128).unwrap();
    let expected: Vec<u32> = (0..128).map(|gid| 4 * gid + 6).collect();
    assert_eq!(out, expected);

    assert_eq!(summary.work_groups, 2);
    assert_eq!(summary.counters.branch, 2 * 4);
    assert_eq!(summary.exports.len(), 128);
    // One export per lane, in work-group then lane order.
    for (gid, export) in summary.exports.iter().enumerate() {
        assert_eq!(export.lane as usize, gid % 64);
        assert_eq!(export.values[0], out[gid], "export of item {gid}");
        assert!(export.done, "final export");
    }
}

#[test]
fn saveexec_masks_divergent_lanes() {
    // out[i] = 1 for the lower half of the wavefront, 0 for the upper half.
    let mut b = KernelBuilder::new("diverge");
    b.push(Vop1 {
        op: Vop1Op::VMovB32,
        vdst: 4,
        src0: Operand::ZERO,
    });
    b.push(Vopc {
        op: VopcOp::VCmpGtU32,
        src0: Operand::int(32),
        vsrc1: 0,
    });
    b.push(Sop1 {
        op: Sop1Op::SAndSaveexecB64,
        sdst: 6,
        ssrc0: Operand::Sreg(VCC_LO),
    });
    b.push(Vop1 {
        op: Vop1Op::VMovB32,
        vdst: 4,
        src0: Operand::int(1),
    });
    b.push(Sop1 {
        op: Sop1Op::SMovB64,
        sdst: EXEC_LO,
        ssrc0: Operand::Sreg(6),
    });
    b.push(Vop2 {
        op: Vop2Op::VLshlrevB32,
        vdst: 5,
        src0: Operand::int(2),
        vsrc1: 0,
    });
    let mut store = Mubuf::new(MubufOp::BufferStoreDword, 4, 5, 0);
    store.offen = true;
    b.push(store);
    b.push(endpgm());
    let kernel = b.build().unwrap();

    let mut emu = Emulator::new(EmulatorConfig::default(), FlatMemory::new()).unwrap();
    emu.run(&kernel, &NdRange::linear(64, 64, vec![0, 0, 0, 0]), None)
        .unwrap();
    let out = emu.memory().read_words(0, 64).unwrap();
    let expected: Vec<u32> = (0..64).map(|i| u32::from(i < 32)).collect();
    assert_eq!(out, expected);
}
