// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Worklist dataflow solver shared by the register analyses.
//!
//! Correctness assumes the usual dataflow conditions: `meet_into` and `transfer_block` are
//! monotone over a finite-height lattice, so iteration reaches a fixpoint. Block order only
//! affects how quickly that happens.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use crate::ir::{BasicBlock, BlockId, Function};

/// Per-block fixpoint states of a solve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Fixpoint<State> {
    /// State at block entry.
    pub(crate) in_states: Vec<State>,
    /// State at block exit.
    pub(crate) out_states: Vec<State>,
    /// Number of block visits until the worklist drained.
    pub(crate) visits: usize,
}

/// Computes a backward dataflow fixpoint.
///
/// The analysis is defined by:
/// - `bottom`: initial state for all blocks, and the identity of `meet_into`
/// - `exit`: OUT state of blocks without successors
/// - `meet_into`: in-place meet used when combining successor IN states into OUT:
///   `acc = meet(acc, succ_in)`
/// - `transfer_block`: transfer function for a single basic block computing IN from OUT
///
/// `order` seeds the worklist; postorder converges fastest for backward problems.
pub(crate) fn solve_backward<State, MeetInto, TransferBlock>(
    function: &Function,
    order: &[BlockId],
    bottom: State,
    exit: &State,
    mut meet_into: MeetInto,
    mut transfer_block: TransferBlock,
) -> Fixpoint<State>
where
    State: Clone + PartialEq,
    MeetInto: FnMut(&mut State, &State),
    TransferBlock: FnMut(usize, &BasicBlock, &State) -> State,
{
    let blocks = function.blocks();
    let n = blocks.len();
    let mut in_states: Vec<State> = (0..n).map(|_| bottom.clone()).collect();
    let mut out_states: Vec<State> = (0..n).map(|_| bottom.clone()).collect();
    let mut visits = 0;

    let mut queued = vec![false; n];
    let mut work: VecDeque<usize> = VecDeque::with_capacity(n);
    for b in order {
        let i = b.index();
        if i < n && !queued[i] {
            queued[i] = true;
            work.push_back(i);
        }
    }

    // Every block needs one visit even if `order` skipped it, or its IN would stay at `bottom`.
    for (i, q) in queued.iter_mut().enumerate() {
        if !*q {
            *q = true;
            work.push_back(i);
        }
    }

    while let Some(b_idx) = work.pop_front() {
        queued[b_idx] = false;
        visits += 1;
        let block = &blocks[b_idx];

        // OUT[b] = meet over IN[succ], or the exogenous exit state.
        let new_out = if block.succs().is_empty() {
            exit.clone()
        } else {
            let mut acc = bottom.clone();
            for succ in block.succs() {
                meet_into(&mut acc, &in_states[succ.index()]);
            }
            acc
        };

        let mut changed = false;
        if new_out != out_states[b_idx] {
            out_states[b_idx] = new_out;
            changed = true;
        }
        // Always recompute IN on the first visit: the transfer may produce non-bottom state
        // even when OUT is still bottom.
        let new_in = transfer_block(b_idx, block, &out_states[b_idx]);
        if new_in != in_states[b_idx] {
            in_states[b_idx] = new_in;
            changed = true;
        }

        if changed {
            for p in block.preds() {
                let p = p.index();
                if !queued[p] {
                    queued[p] = true;
                    work.push_back(p);
                }
            }
        }
    }

    Fixpoint {
        in_states,
        out_states,
        visits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::postorder;

    // Counts the blocks on the longest path to an exit, capped at 8.
    #[test]
    fn backward_solve_propagates_against_edges() {
        let mut f = Function::new("k", 1, 1);
        let a = f.add_block("a");
        let b = f.add_block("b");
        let c = f.add_block("c");
        f.add_edge(a, b).unwrap();
        f.add_edge(b, c).unwrap();

        let order = postorder(&f);
        let sol = solve_backward(
            &f,
            &order,
            0_u32,
            &0,
            |acc, succ_in| *acc = (*acc).max(*succ_in),
            |_, _, out| (*out + 1).min(8),
        );
        assert_eq!(sol.in_states, [3, 2, 1]);
        assert_eq!(sol.out_states, [2, 1, 0]);
        assert!(sol.visits >= 3, "each block is visited at least once");
    }

    #[test]
    fn loop_reaches_the_cap() {
        let mut f = Function::new("k", 1, 1);
        let a = f.add_block("a");
        let b = f.add_block("b");
        f.add_edge(a, b).unwrap();
        f.add_edge(b, a).unwrap();
        let sol = solve_backward(
            &f,
            &[],
            0_u32,
            &0,
            |acc, succ_in| *acc = (*acc).max(*succ_in),
            |_, _, out| (*out + 1).min(8),
        );
        assert_eq!(sol.in_states, [8, 8]);
    }
}
