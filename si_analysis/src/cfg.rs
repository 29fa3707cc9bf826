// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Block orderings over a [`Function`]'s control-flow graph.

use alloc::vec;
use alloc::vec::Vec;

use crate::ir::{BlockId, Function};

/// Returns every block in postorder of a depth-first walk from the entry block.
///
/// Blocks unreachable from the entry follow, each walked as its own root in layout order, so the
/// result is always a permutation of the function's blocks.
#[must_use]
pub fn postorder(function: &Function) -> Vec<BlockId> {
    let blocks = function.blocks();
    let mut visited = vec![false; blocks.len()];
    let mut order = Vec::with_capacity(blocks.len());
    // (block, next successor to visit)
    let mut stack: Vec<(BlockId, usize)> = Vec::new();

    for root in blocks.iter().map(|b| b.id()) {
        if visited[root.index()] {
            continue;
        }
        visited[root.index()] = true;
        stack.push((root, 0));

        while let Some((block, next)) = stack.last_mut() {
            let succs = blocks[block.index()].succs();
            if let Some(&succ) = succs.get(*next) {
                *next += 1;
                if !visited[succ.index()] {
                    visited[succ.index()] = true;
                    stack.push((succ, 0));
                }
            } else {
                order.push(*block);
                stack.pop();
            }
        }
    }

    order
}

/// Returns every block in reverse postorder (entry first).
#[must_use]
pub fn reverse_postorder(function: &Function) -> Vec<BlockId> {
    let mut order = postorder(function);
    order.reverse();
    order
}
