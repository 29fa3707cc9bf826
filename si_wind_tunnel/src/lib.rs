// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic workloads for the benchmarks in `benches/`.

use si_analysis::{Argument, Function, Instruction};
use si_emulator::{Kernel, KernelBuilder, Operand, Sop2, Sopc, Sopp, Vop2, Vop3a};
use si_isa::{RegClass, Sop2Op, SopcOp, SoppOp, Vop2Op, Vop3Op};

/// A chain of `blocks` blocks, each with a self loop and a back edge to the block four earlier.
///
/// Every block mixes `width` vector registers with a rolling three-address pattern, so live ranges
/// cross block boundaries and the loops force several fixpoint rounds.
#[must_use]
pub fn looped_chain(blocks: usize, width: u32) -> Function {
    let width = width.max(4);
    let mut f = Function::new("looped_chain", width, 4);
    let ids: Vec<_> = (0..blocks).map(|i| f.add_block(format!("b{i}"))).collect();
    for (i, &id) in ids.iter().enumerate() {
        let base = u32::try_from(i).unwrap_or(0) % width;
        for k in 0..6 {
            let dst = (base + k) % width;
            let a = (base + k + 1) % width;
            let b = (base + 2 * k + 3) % width;
            let inst = Instruction::new(
                Vop2Op::VAddF32,
                vec![Argument::vdst(dst), Argument::vsrc(a), Argument::vsrc(b)],
            );
            f.push(id, inst).expect("registers are below the declared width");
        }
        f.push(
            id,
            Instruction::new(
                Sop2Op::SAddU32,
                vec![Argument::sdst(0), Argument::ssrc(0), Argument::ssrc(1)],
            ),
        )
        .expect("scalar registers are declared");
        f.add_edge(id, id).expect("block exists");
        if let Some(&next) = ids.get(i + 1) {
            f.add_edge(id, next).expect("block exists");
        }
        if i >= 4 {
            f.add_edge(id, ids[i - 4]).expect("block exists");
        }
    }
    f.set_live_out(RegClass::Vector, [0, 1])
        .expect("registers are below the declared width");
    f
}

/// A kernel that runs `iterations` rounds of `v2 = v2 * v1 + v0` under a scalar loop counter.
#[must_use]
pub fn alu_loop(iterations: u32) -> Kernel {
    let mut b = KernelBuilder::new("alu_loop");
    b.push(Sop2 {
        op: Sop2Op::SAndB32,
        sdst: 8,
        ssrc0: Operand::ZERO,
        ssrc1: Operand::ZERO,
    });
    b.label("loop").expect("fresh label");
    b.push(Vop3a::new(
        Vop3Op::VMadF32,
        2,
        [Operand::Vreg(2), Operand::Vreg(1), Operand::Vreg(0)],
    ));
    b.push(Vop2 {
        op: Vop2Op::VAddI32,
        vdst: 3,
        src0: Operand::Sreg(8),
        vsrc1: 3,
    });
    b.push(Sop2 {
        op: Sop2Op::SAddU32,
        sdst: 8,
        ssrc0: Operand::Sreg(8),
        ssrc1: Operand::int(1),
    });
    b.push(Sopc {
        op: SopcOp::SCmpLtU32,
        ssrc0: Operand::Sreg(8),
        ssrc1: Operand::Literal(iterations),
    });
    b.branch(SoppOp::SCbranchScc1, "loop");
    b.push(Sopp {
        op: SoppOp::SEndpgm,
        simm16: 0,
    });
    b.build().expect("every branch target is defined")
}
