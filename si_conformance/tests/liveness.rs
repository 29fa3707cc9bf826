// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Liveness dataflow laws on straight-line, branching and looping functions.

use si_analysis::{Argument, BitSet, BlockLivenessInfo, Function, Instruction, LivenessAnalysis};
use si_isa::{RegClass, Sop1Op, Sop2Op, SopcOp, SoppOp, Vop1Op, Vop2Op};

fn bits(set: &BitSet) -> Vec<usize> {
    set.ones().collect()
}

fn vop2(op: Vop2Op, dst: u32, a: u32, b: u32) -> Instruction {
    Instruction::new(
        op,
        vec![Argument::vdst(dst), Argument::vsrc(a), Argument::vsrc(b)],
    )
}

/// A counted loop that accumulates into `v1` and leaves `v3` live at exit.
fn counted_loop() -> Function {
    let mut f = Function::new("loop", 4, 2);
    let entry = f.add_block("entry");
    let body = f.add_block("body");
    let exit = f.add_block("exit");

    f.push(
        entry,
        Instruction::new(
            Sop1Op::SMovB32,
            vec![Argument::sdst(0), Argument::Literal(0)],
        ),
    )
    .unwrap();
    f.push(
        entry,
        Instruction::new(
            Vop1Op::VCvtF32U32,
            vec![Argument::vdst(0), Argument::Literal(3)],
        ),
    )
    .unwrap();

    f.push(body, vop2(Vop2Op::VAddF32, 1, 0, 2)).unwrap();
    f.push(
        body,
        Instruction::new(
            Sop2Op::SAddU32,
            vec![Argument::sdst(0), Argument::ssrc(0), Argument::Literal(1)],
        ),
    )
    .unwrap();
    f.push(
        body,
        Instruction::new(
            SopcOp::SCmpLtU32,
            vec![Argument::ssrc(0), Argument::ssrc(1)],
        ),
    )
    .unwrap();
    f.push(
        body,
        Instruction::new(SoppOp::SCbranchScc1, vec![Argument::Label(body)]),
    )
    .unwrap();

    f.push(exit, vop2(Vop2Op::VMulF32, 3, 1, 0)).unwrap();

    f.add_edge(entry, body).unwrap();
    f.add_edge(body, body).unwrap();
    f.add_edge(body, exit).unwrap();
    f.set_live_out(RegClass::Vector, [3]).unwrap();
    f
}

/// `entry` branches to `left` or `right`, which both fall into `join`.
fn diamond() -> Function {
    let mut f = Function::new("diamond", 6, 1);
    let entry = f.add_block("entry");
    let left = f.add_block("left");
    let right = f.add_block("right");
    let join = f.add_block("join");
    f.push(
        entry,
        Instruction::new(
            SoppOp::SCbranchVccz,
            vec![Argument::Label(right), Argument::ssrc(0)],
        ),
    )
    .unwrap();
    f.push(left, vop2(Vop2Op::VAddI32, 4, 0, 1)).unwrap();
    f.push(right, vop2(Vop2Op::VSubF32, 4, 2, 3)).unwrap();
    f.push(join, vop2(Vop2Op::VMulF32, 5, 4, 0)).unwrap();
    f.add_edge(entry, left).unwrap();
    f.add_edge(entry, right).unwrap();
    f.add_edge(left, join).unwrap();
    f.add_edge(right, join).unwrap();
    f
}

fn check_laws(liveness: &LivenessAnalysis<'_>) {
    let function = liveness.function();
    for block in function.blocks() {
        let info = liveness.info(block.id()).unwrap();
        for class in [RegClass::Vector, RegClass::Scalar] {
            let sets = info.class(class);

            let mut expected_in = sets.live_out.clone();
            expected_in.subtract_with(&sets.defs);
            expected_in.union_with(&sets.uses);
            assert_eq!(
                sets.live_in,
                expected_in,
                "in = (out - def) | use for {} ({class:?})",
                block.name()
            );

            let mut expected_out = BitSet::new_empty(function.register_count(class) as usize);
            if block.succs().is_empty() {
                for &r in function.live_out(class) {
                    expected_out.set(r as usize);
                }
            }
            for &succ in block.succs() {
                expected_out.union_with(&liveness.info(succ).unwrap().class(class).live_in);
            }
            assert_eq!(
                sets.live_out,
                expected_out,
                "out = union of successor ins for {} ({class:?})",
                block.name()
            );
        }
    }
}

fn snapshot(liveness: &LivenessAnalysis<'_>) -> Vec<BlockLivenessInfo> {
    liveness
        .function()
        .blocks()
        .iter()
        .map(|b| liveness.info(b.id()).unwrap().clone())
        .collect()
}

#[test]
fn straight_line_block() {
    let mut f = Function::new("straight", 5, 0);
    let b = f.add_block("b");
    f.push(b, vop2(Vop2Op::VAddI32, 0, 1, 2)).unwrap();
    f.push(b, vop2(Vop2Op::VAddI32, 3, 0, 4)).unwrap();

    let mut liveness = LivenessAnalysis::new(&f);
    liveness.run();
    let v = &liveness.info(b).unwrap().vector;
    assert_eq!(bits(&v.uses), [1, 2, 4]);
    assert_eq!(bits(&v.defs), [0, 3]);
    assert_eq!(bits(&v.live_in), [1, 2, 4]);
    assert!(v.live_out.is_clear(), "exit block has empty live-out");
    check_laws(&liveness);
}

#[test]
fn fixpoint_laws_hold_on_a_loop() {
    let f = counted_loop();
    let mut liveness = LivenessAnalysis::new(&f);
    liveness.run();
    check_laws(&liveness);

    let body = f.blocks()[1].id();
    let info = liveness.info(body).unwrap();
    // v0 and v2 are carried around the back edge; v1 is redefined every iteration.
    assert_eq!(bits(&info.vector.live_in), [0, 2]);
    assert_eq!(bits(&info.vector.live_out), [0, 1, 2]);
    assert_eq!(bits(&info.scalar.live_in), [0, 1]);
    let entry = f.blocks()[0].id();
    assert_eq!(bits(&liveness.info(entry).unwrap().vector.live_in), [2]);
}

#[test]
fn fixpoint_laws_hold_on_a_diamond() {
    let f = diamond();
    let mut liveness = LivenessAnalysis::new(&f);
    liveness.run();
    check_laws(&liveness);
    let entry = liveness.info(f.blocks()[0].id()).unwrap();
    assert_eq!(bits(&entry.vector.live_in), [0, 1, 2, 3]);
    assert_eq!(bits(&entry.scalar.uses), [0]);
}

#[test]
fn rerunning_is_idempotent() {
    for f in [counted_loop(), diamond()] {
        let mut liveness = LivenessAnalysis::new(&f);
        liveness.run();
        let first = snapshot(&liveness);
        liveness.run();
        assert_eq!(snapshot(&liveness), first, "{} drifted", f.name());
    }
}

#[test]
fn declared_live_out_reaches_the_exit_block_only() {
    let f = counted_loop();
    let mut liveness = LivenessAnalysis::new(&f);
    liveness.run();
    let exit = liveness.info(f.blocks()[2].id()).unwrap();
    assert_eq!(bits(&exit.vector.live_out), [3]);
    assert_eq!(bits(&exit.vector.live_in), [0, 1]);
}
