// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Register interference graphs.
//!
//! Nodes live in an arena and refer to each other by register id, so edges are plain integers and
//! the graph can be edited freely by a downstream allocator. A node covering a register series is
//! keyed by the series' lowest register, and every register it covers maps back to it.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use si_isa::RegClass;
use tracing::{debug, trace};

use crate::error::GraphError;
use crate::ir::{Argument, Direction, Function};
use crate::liveness::LivenessAnalysis;

/// Allocation state of a conflict graph node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// In the graph, no color yet.
    Uncolored,
    /// Temporarily taken out of the graph; its edges are remembered.
    Removed,
    /// Put back with a color.
    Colored,
}

/// One symbolic register (or register series) in a [`ConflictGraph`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictGraphNode {
    id: u32,
    size: u32,
    color: Option<u32>,
    state: NodeState,
    neighbors: BTreeSet<u32>,
    detached: Vec<u32>,
}

impl ConflictGraphNode {
    fn new(id: u32, size: u32) -> Self {
        Self {
            id,
            size,
            color: None,
            state: NodeState::Uncolored,
            neighbors: BTreeSet::new(),
            detached: Vec::new(),
        }
    }

    /// Register id (lowest register of a series).
    #[must_use]
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number of consecutive physical registers the value needs.
    #[must_use]
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Assigned color, once restored.
    #[must_use]
    #[inline]
    pub fn color(&self) -> Option<u32> {
        self.color
    }

    /// Current state.
    #[must_use]
    #[inline]
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Number of attached neighbors.
    #[must_use]
    #[inline]
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    /// Attached neighbor ids in ascending order.
    pub fn neighbors(&self) -> impl Iterator<Item = u32> + '_ {
        self.neighbors.iter().copied()
    }

    /// Returns `true` if `other` is an attached neighbor.
    #[must_use]
    pub fn is_adjacent(&self, other: u32) -> bool {
        self.neighbors.contains(&other)
    }
}

/// Interference graph over the registers of one class.
///
/// Adjacency is symmetric at every observable point: each edit updates both endpoints before
/// returning.
#[derive(Clone, Debug)]
pub struct ConflictGraph {
    class: RegClass,
    nodes: Vec<ConflictGraphNode>,
    index: HashMap<u32, usize>,
    owner: HashMap<u32, u32>,
    edges: usize,
}

impl ConflictGraph {
    /// Creates an empty graph for `class`.
    #[must_use]
    pub fn new(class: RegClass) -> Self {
        Self {
            class,
            nodes: Vec::new(),
            index: HashMap::new(),
            owner: HashMap::new(),
            edges: 0,
        }
    }

    /// Register class of this graph.
    #[must_use]
    pub fn class(&self) -> RegClass {
        self.class
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of attached edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &ConflictGraphNode> + '_ {
        self.nodes.iter()
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: u32) -> Option<&ConflictGraphNode> {
        self.nodes.get(*self.index.get(&id)?)
    }

    /// Returns the id of the node covering register `reg`.
    #[must_use]
    pub fn owner_of(&self, reg: u32) -> Option<u32> {
        self.owner.get(&reg).copied()
    }

    /// Adds a node for `size` registers starting at `id` and returns the id of the node that
    /// covers them.
    ///
    /// Nodes never overlap. A range that already lies inside one node returns that node. A range
    /// overlapping other nodes merges them into one node spanning all of their registers: edges
    /// to outside nodes move to the merged node, and edges among the merged nodes disappear.
    /// Only uncolored nodes can be merged.
    pub fn add_node(&mut self, id: u32, size: u32) -> Result<u32, GraphError> {
        let mut low = id;
        let mut high = id.saturating_add(size.max(1) - 1);
        let mut merged: Vec<u32> = Vec::new();
        let mut reg = low;
        while reg <= high {
            if let Some(owner) = self.owner_of(reg)
                && !merged.contains(&owner)
            {
                let node = &self.nodes[self.slot(owner)?];
                if node.state != NodeState::Uncolored {
                    return Err(GraphError::BadState {
                        id: owner,
                        state: node.state,
                    });
                }
                low = low.min(node.id);
                high = high.max(node.id.saturating_add(node.size - 1));
                merged.push(owner);
            }
            let Some(next) = reg.checked_add(1) else {
                break;
            };
            reg = next;
        }

        if let [owner] = merged[..] {
            let node = &self.nodes[self.slot(owner)?];
            if node.id == low && node.size == high - low + 1 {
                return Ok(owner);
            }
        }
        if merged.is_empty() {
            self.index.insert(low, self.nodes.len());
            self.nodes.push(ConflictGraphNode::new(low, high - low + 1));
        } else {
            self.merge(&merged, low, high)?;
        }
        for reg in low..=high {
            self.owner.insert(reg, low);
        }
        Ok(low)
    }

    /// Replaces the uncolored nodes `merged` with one node `low..=high`.
    fn merge(&mut self, merged: &[u32], low: u32, high: u32) -> Result<(), GraphError> {
        let mut slots = Vec::with_capacity(merged.len());
        let mut outside = BTreeSet::new();
        let mut inner_half_edges = 0;
        for &m in merged {
            let i = self.slot(m)?;
            slots.push(i);
            for n in core::mem::take(&mut self.nodes[i].neighbors) {
                if merged.contains(&n) {
                    inner_half_edges += 1;
                } else {
                    let j = self.slot(n)?;
                    self.nodes[j].neighbors.remove(&m);
                    self.edges -= 1;
                    outside.insert(n);
                }
            }
        }
        self.edges -= inner_half_edges / 2;

        // Removed neighbors remember edges by id; point them at the merged node.
        for node in &mut self.nodes {
            if node.detached.iter().any(|d| merged.contains(d)) {
                for d in &mut node.detached {
                    if merged.contains(d) {
                        *d = low;
                    }
                }
                node.detached.sort_unstable();
                node.detached.dedup();
            }
        }

        let first = slots.iter().copied().min().unwrap_or(0);
        let mut node = ConflictGraphNode::new(low, high - low + 1);
        for &n in &outside {
            let j = self.slot(n)?;
            self.nodes[j].neighbors.insert(low);
        }
        self.edges += outside.len();
        node.neighbors = outside;
        self.nodes[first] = node;

        let mut slot = 0;
        self.nodes.retain(|_| {
            let keep = slot == first || !slots.contains(&slot);
            slot += 1;
            keep
        });
        self.index.clear();
        for (i, node) in self.nodes.iter().enumerate() {
            self.index.insert(node.id, i);
        }
        Ok(())
    }

    /// Returns `true` if `a` and `b` are attached neighbors.
    #[must_use]
    pub fn contains_edge(&self, a: u32, b: u32) -> bool {
        self.node(a).is_some_and(|n| n.is_adjacent(b))
    }

    /// Connects `a` and `b`.
    ///
    /// Both nodes must exist and be in the graph; self edges and duplicates are rejected.
    pub fn add_neighbor(&mut self, a: u32, b: u32) -> Result<(), GraphError> {
        if a == b {
            return Err(GraphError::SelfEdge { node: a });
        }
        let ia = self.present(a)?;
        let ib = self.present(b)?;
        if self.nodes[ia].neighbors.contains(&b) {
            return Err(GraphError::DuplicateEdge { a, b });
        }
        self.nodes[ia].neighbors.insert(b);
        self.nodes[ib].neighbors.insert(a);
        self.edges += 1;
        Ok(())
    }

    /// Disconnects `a` and `b`.
    pub fn remove_neighbor(&mut self, a: u32, b: u32) -> Result<(), GraphError> {
        let ia = self.slot(a)?;
        let ib = self.slot(b)?;
        if !self.nodes[ia].neighbors.remove(&b) {
            return Err(GraphError::MissingEdge { a, b });
        }
        self.nodes[ib].neighbors.remove(&a);
        self.edges -= 1;
        Ok(())
    }

    /// Takes `id` out of the graph, detaching and remembering its edges.
    pub fn remove_node(&mut self, id: u32) -> Result<(), GraphError> {
        let i = self.slot(id)?;
        let node = &mut self.nodes[i];
        if node.state != NodeState::Uncolored {
            return Err(GraphError::BadState {
                id,
                state: node.state,
            });
        }
        node.state = NodeState::Removed;
        let detached: Vec<u32> = core::mem::take(&mut node.neighbors).into_iter().collect();
        for &n in &detached {
            let j = self.slot(n)?;
            self.nodes[j].neighbors.remove(&id);
        }
        self.edges -= detached.len();
        self.nodes[i].detached = detached;
        Ok(())
    }

    /// Puts a removed node back with `color`, re-attaching its remembered edges.
    ///
    /// Neighbors that are still removed get the edge back when they are restored themselves, so
    /// nodes may be restored in any order.
    pub fn restore_node(&mut self, id: u32, color: u32) -> Result<(), GraphError> {
        let i = self.slot(id)?;
        let node = &mut self.nodes[i];
        if node.state != NodeState::Removed {
            return Err(GraphError::BadState {
                id,
                state: node.state,
            });
        }
        node.state = NodeState::Colored;
        node.color = Some(color);
        let detached = core::mem::take(&mut node.detached);
        for n in detached {
            let j = self.slot(n)?;
            if self.nodes[j].state == NodeState::Removed {
                self.nodes[j].detached.push(id);
            } else {
                self.nodes[i].neighbors.insert(n);
                self.nodes[j].neighbors.insert(id);
                self.edges += 1;
            }
        }
        Ok(())
    }

    /// Writes nodes and their neighbors.
    pub fn dump(&self, out: &mut impl fmt::Write) -> fmt::Result {
        let p = self.class.prefix();
        writeln!(
            out,
            "{} conflict graph: {} nodes, {} edges",
            class_name(self.class),
            self.nodes.len(),
            self.edges
        )?;
        for node in &self.nodes {
            write!(
                out,
                "  {p}{} (size {}, degree {}",
                node.id,
                node.size,
                node.degree()
            )?;
            if let Some(color) = node.color {
                write!(out, ", color {color}")?;
            }
            out.write_char(')')?;
            if !node.neighbors.is_empty() {
                out.write_char(':')?;
                for n in &node.neighbors {
                    write!(out, " {p}{n}")?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn slot(&self, id: u32) -> Result<usize, GraphError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(GraphError::UnknownNode { id })
    }

    fn present(&self, id: u32) -> Result<usize, GraphError> {
        let i = self.slot(id)?;
        match self.nodes[i].state {
            NodeState::Removed => Err(GraphError::BadState {
                id,
                state: NodeState::Removed,
            }),
            NodeState::Uncolored | NodeState::Colored => Ok(i),
        }
    }

    fn node_for(&mut self, reg: u32) -> Result<u32, GraphError> {
        match self.owner_of(reg) {
            Some(id) => Ok(id),
            None => self.add_node(reg, 1),
        }
    }
}

fn class_name(class: RegClass) -> &'static str {
    match class {
        RegClass::Vector => "vector",
        RegClass::Scalar => "scalar",
    }
}

/// Vector and scalar conflict graphs of one function.
#[derive(Clone, Debug)]
pub struct ConflictGraphs {
    /// Vector register graph.
    pub vector: ConflictGraph,
    /// Scalar register graph.
    pub scalar: ConflictGraph,
}

impl ConflictGraphs {
    /// Builds both graphs from a completed liveness pass.
    ///
    /// Blocks are walked last to first and instructions bottom-up, keeping the set of registers
    /// live at the current point. Each register defined by an instruction interferes with every
    /// other register live across that definition. `PHI` and plain moves add no edges, since
    /// their operands may later share a register, but still update the live set.
    pub fn build(liveness: &LivenessAnalysis<'_>) -> Result<Self, GraphError> {
        let vector = build_class(liveness, RegClass::Vector)?;
        let scalar = build_class(liveness, RegClass::Scalar)?;
        debug!(
            function = liveness.function().name(),
            vector_nodes = vector.len(),
            vector_edges = vector.edge_count(),
            scalar_nodes = scalar.len(),
            scalar_edges = scalar.edge_count(),
            "conflict graphs built"
        );
        Ok(Self { vector, scalar })
    }

    /// The graph for `class`.
    #[must_use]
    pub fn class(&self, class: RegClass) -> &ConflictGraph {
        match class {
            RegClass::Vector => &self.vector,
            RegClass::Scalar => &self.scalar,
        }
    }

    /// Writes both graphs.
    pub fn dump(&self, out: &mut impl fmt::Write) -> fmt::Result {
        self.vector.dump(out)?;
        self.scalar.dump(out)
    }
}

fn build_class(
    liveness: &LivenessAnalysis<'_>,
    class: RegClass,
) -> Result<ConflictGraph, GraphError> {
    let function = liveness.function();
    let mut graph = ConflictGraph::new(class);
    add_register_nodes(&mut graph, function, class)?;

    for block in function.blocks().iter().rev() {
        let info = liveness
            .info(block.id())
            .ok_or(GraphError::MissingLiveness { block: block.id() })?;
        let mut live = info.class(class).live_out.clone();

        for inst in block.instructions().iter().rev() {
            let opcode = inst.opcode();
            if !opcode.is_phi() && !opcode.is_move() {
                for d in inst.registers(class, Direction::Destination) {
                    let dn = graph.node_for(d)?;
                    for r in live.ones() {
                        let Ok(r) = u32::try_from(r) else {
                            continue;
                        };
                        let rn = graph.node_for(r)?;
                        if rn == dn || graph.contains_edge(dn, rn) {
                            continue;
                        }
                        graph.add_neighbor(dn, rn)?;
                        trace!(class = ?class, a = dn, b = rn, "interference");
                    }
                }
            }

            for d in inst.registers(class, Direction::Destination) {
                live.clear(d as usize);
            }
            for s in inst.registers(class, Direction::Source) {
                live.set(s as usize);
            }
        }
    }

    Ok(graph)
}

/// Creates nodes for every defined register and for every series, read or written, so a series
/// is one node no matter in which order its registers show up.
fn add_register_nodes(
    graph: &mut ConflictGraph,
    function: &Function,
    class: RegClass,
) -> Result<(), GraphError> {
    let args = function
        .blocks()
        .iter()
        .flat_map(|b| b.instructions())
        .flat_map(|inst| inst.args());
    for arg in args {
        match *arg {
            Argument::Register {
                class: c,
                id,
                direction: Direction::Destination,
            } if c == class => {
                graph.add_node(id, 1)?;
            }
            Argument::RegisterSeries {
                class: c, low, high, ..
            } if c == class => {
                graph.add_node(low, high - low + 1)?;
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::ir::Instruction;
    use si_isa::{Sop1Op, Sop2Op, Vop1Op, Vop2Op};
    use std::string::String;
    use std::vec;
    use std::vec::Vec;

    fn neighbors(graph: &ConflictGraph, id: u32) -> Vec<u32> {
        graph.node(id).unwrap().neighbors().collect()
    }

    fn assert_symmetric(graph: &ConflictGraph) {
        for node in graph.nodes() {
            for n in node.neighbors() {
                assert!(
                    graph.contains_edge(n, node.id()),
                    "{} -> {n} has no reverse edge",
                    node.id()
                );
            }
        }
    }

    #[test]
    fn strict_edge_edits() {
        let mut g = ConflictGraph::new(RegClass::Vector);
        g.add_node(0, 1).unwrap();
        g.add_node(1, 1).unwrap();
        assert_eq!(g.add_neighbor(0, 0), Err(GraphError::SelfEdge { node: 0 }));
        g.add_neighbor(0, 1).unwrap();
        assert_eq!(
            g.add_neighbor(1, 0),
            Err(GraphError::DuplicateEdge { a: 1, b: 0 })
        );
        assert_eq!(g.add_neighbor(0, 9), Err(GraphError::UnknownNode { id: 9 }));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.node(1).unwrap().degree(), 1);
        g.remove_neighbor(1, 0).unwrap();
        assert_eq!(
            g.remove_neighbor(0, 1),
            Err(GraphError::MissingEdge { a: 0, b: 1 })
        );
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn remove_and_restore_in_any_order_keeps_symmetry() {
        let mut g = ConflictGraph::new(RegClass::Vector);
        for id in 0..3 {
            g.add_node(id, 1).unwrap();
        }
        g.add_neighbor(0, 1).unwrap();
        g.add_neighbor(0, 2).unwrap();
        g.add_neighbor(1, 2).unwrap();

        g.remove_node(0).unwrap();
        assert_eq!(neighbors(&g, 1), [2]);
        g.remove_node(1).unwrap();
        assert_eq!(g.edge_count(), 0);
        assert_eq!(
            g.remove_node(1),
            Err(GraphError::BadState {
                id: 1,
                state: NodeState::Removed
            })
        );
        assert_eq!(
            g.add_neighbor(1, 2),
            Err(GraphError::BadState {
                id: 1,
                state: NodeState::Removed
            })
        );

        // Restore out of LIFO order.
        g.restore_node(0, 5).unwrap();
        assert_eq!(neighbors(&g, 0), [2]);
        g.restore_node(1, 6).unwrap();
        assert_eq!(neighbors(&g, 0), [1, 2]);
        assert_eq!(neighbors(&g, 1), [0, 2]);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.node(0).unwrap().color(), Some(5));
        assert_eq!(g.node(1).unwrap().state(), NodeState::Colored);
        assert_symmetric(&g);
        assert_eq!(
            g.restore_node(1, 0),
            Err(GraphError::BadState {
                id: 1,
                state: NodeState::Colored
            })
        );
    }

    #[test]
    fn building_before_liveness_is_an_error() {
        let mut f = Function::new("k", 2, 1);
        let b = f.add_block("entry");
        let pass = LivenessAnalysis::new(&f);
        assert_eq!(
            ConflictGraphs::build(&pass).unwrap_err(),
            GraphError::MissingLiveness { block: b }
        );
    }

    #[test]
    fn moves_add_no_edges_but_still_extend_liveness() {
        // v1 = v0 (move), v2 = v0 + v1, with v0 live into the block.
        let mut f = Function::new("k", 3, 1);
        let b = f.add_block("entry");
        f.push(
            b,
            Instruction::new(Vop1Op::VMovB32, vec![Argument::vdst(1), Argument::vsrc(0)]),
        )
        .unwrap();
        f.push(
            b,
            Instruction::new(
                Vop2Op::VAddI32,
                vec![Argument::vdst(2), Argument::vsrc(0), Argument::vsrc(1)],
            ),
        )
        .unwrap();
        let mut pass = LivenessAnalysis::new(&f);
        pass.run();
        let graphs = ConflictGraphs::build(&pass).unwrap();
        let g = &graphs.vector;
        // Nothing is live across the add, and the move is exempt.
        assert_eq!(g.edge_count(), 0);
        assert!(g.node(1).is_some());
        assert!(g.node(2).is_some());
    }

    #[test]
    fn series_share_one_node_and_source_only_registers_get_nodes() {
        // s[2:3] = s[0:1] & s4 ; s5 = s2 + s4 ; live-out {s3, s5}
        let mut f = Function::new("k", 1, 6);
        let b = f.add_block("entry");
        f.push(
            b,
            Instruction::new(
                Sop2Op::SAndB64,
                vec![
                    Argument::series(RegClass::Scalar, 2, 3, Direction::Destination),
                    Argument::series(RegClass::Scalar, 0, 1, Direction::Source),
                    Argument::ssrc(4),
                ],
            ),
        )
        .unwrap();
        f.push(
            b,
            Instruction::new(
                Sop2Op::SAddU32,
                vec![Argument::sdst(5), Argument::ssrc(2), Argument::ssrc(4)],
            ),
        )
        .unwrap();
        f.set_live_out(RegClass::Scalar, [3, 5]).unwrap();
        let mut pass = LivenessAnalysis::new(&f);
        pass.run();
        let graphs = ConflictGraphs::build(&pass).unwrap();
        let g = &graphs.scalar;

        assert_eq!(g.node(2).unwrap().size(), 2);
        assert_eq!(g.owner_of(3), Some(2));
        // s5 is defined while s3 (part of s[2:3]) is live.
        assert_eq!(neighbors(&g, 5), [2]);
        // s[2:3] is defined while s4 is live; s4 was never defined so its node is on demand.
        assert!(g.contains_edge(2, 4));
        assert_eq!(g.node(4).unwrap().size(), 1);
        assert_symmetric(g);
    }

    fn sop2(op: Sop2Op, dst: Argument, a: Argument, b: Argument) -> Instruction {
        Instruction::new(op, vec![dst, a, b])
    }

    fn sseries(low: u32, high: u32, direction: Direction) -> Argument {
        Argument::series(RegClass::Scalar, low, high, direction)
    }

    #[test]
    fn series_absorbs_an_earlier_single_register() {
        // s2 = s0 + s1 ; s[2:3] = s[4:5] & s[6:7] ; s8 = s3 + s2
        let mut f = Function::new("k", 1, 9);
        let b = f.add_block("entry");
        f.push(
            b,
            sop2(
                Sop2Op::SAddU32,
                Argument::sdst(2),
                Argument::ssrc(0),
                Argument::ssrc(1),
            ),
        )
        .unwrap();
        f.push(
            b,
            sop2(
                Sop2Op::SAndB64,
                sseries(2, 3, Direction::Destination),
                sseries(4, 5, Direction::Source),
                sseries(6, 7, Direction::Source),
            ),
        )
        .unwrap();
        f.push(
            b,
            sop2(
                Sop2Op::SAddU32,
                Argument::sdst(8),
                Argument::ssrc(3),
                Argument::ssrc(2),
            ),
        )
        .unwrap();
        f.set_live_out(RegClass::Scalar, [8]).unwrap();
        let mut pass = LivenessAnalysis::new(&f);
        pass.run();
        let graphs = ConflictGraphs::build(&pass).unwrap();
        let g = &graphs.scalar;

        assert_eq!(g.node(2).unwrap().size(), 2);
        assert_eq!(g.owner_of(3), Some(2));
        assert!(g.node(3).is_none(), "s3 is part of s[2:3]");
        // Source-only series are single nodes as well.
        assert_eq!(g.node(4).unwrap().size(), 2);
        assert_eq!(g.owner_of(5), Some(4));
        assert!(g.node(5).is_none(), "s5 is part of s[4:5]");
        assert!(g.node(7).is_none(), "s7 is part of s[6:7]");
        assert_eq!(neighbors(g, 2), [4, 6]);
        assert_eq!(g.len(), 4);
        assert_symmetric(g);
    }

    #[test]
    fn single_register_inside_a_series_reuses_its_node() {
        // s[0:1] = s[2:3] & s[4:5] ; s1 = s1 + s0 ; live-out {s1, s6}
        let mut f = Function::new("k", 1, 7);
        let b = f.add_block("entry");
        f.push(
            b,
            sop2(
                Sop2Op::SAndB64,
                sseries(0, 1, Direction::Destination),
                sseries(2, 3, Direction::Source),
                sseries(4, 5, Direction::Source),
            ),
        )
        .unwrap();
        f.push(
            b,
            sop2(
                Sop2Op::SAddU32,
                Argument::sdst(1),
                Argument::ssrc(1),
                Argument::ssrc(0),
            ),
        )
        .unwrap();
        f.set_live_out(RegClass::Scalar, [1, 6]).unwrap();
        let mut pass = LivenessAnalysis::new(&f);
        pass.run();
        let graphs = ConflictGraphs::build(&pass).unwrap();
        let g = &graphs.scalar;

        assert!(g.node(1).is_none(), "no separate node for s1");
        assert_eq!(g.owner_of(1), Some(0));
        assert_eq!(g.node(0).unwrap().size(), 2);
        // s6 is live across the write of s1, which belongs to s[0:1].
        assert_eq!(neighbors(g, 0), [6]);
        assert_eq!(g.node(6).unwrap().size(), 1);
        assert_eq!(g.len(), 4);
        assert_symmetric(g);
    }

    #[test]
    fn merging_nodes_keeps_outside_edges() {
        let mut g = ConflictGraph::new(RegClass::Scalar);
        for id in [2, 3, 5, 7, 9] {
            g.add_node(id, 1).unwrap();
        }
        g.add_neighbor(2, 3).unwrap();
        g.add_neighbor(3, 5).unwrap();
        g.add_neighbor(2, 7).unwrap();
        g.add_neighbor(3, 9).unwrap();
        g.remove_node(9).unwrap();

        assert_eq!(g.add_node(2, 2), Ok(2));
        assert!(g.node(3).is_none(), "s3 merged into s[2:3]");
        assert_eq!(g.owner_of(3), Some(2));
        assert_eq!(g.node(2).unwrap().size(), 2);
        assert_eq!(neighbors(&g, 2), [5, 7]);
        assert_eq!(neighbors(&g, 5), [2]);
        assert_eq!(g.edge_count(), 2);
        assert_symmetric(&g);

        // A register already covered resolves to its owner.
        assert_eq!(g.add_node(3, 1), Ok(2));
        assert_eq!(g.len(), 4);

        // The removed neighbor comes back attached to the merged node.
        g.restore_node(9, 0).unwrap();
        assert_eq!(neighbors(&g, 2), [5, 7, 9]);
        assert_eq!(g.edge_count(), 3);
        assert_symmetric(&g);

        // Colored nodes keep their shape.
        assert_eq!(
            g.add_node(8, 2),
            Err(GraphError::BadState {
                id: 9,
                state: NodeState::Colored
            })
        );
    }

    #[test]
    fn scalar_moves_are_exempt_too() {
        let mut f = Function::new("k", 1, 4);
        let b = f.add_block("entry");
        f.push(
            b,
            Instruction::new(Sop1Op::SMovB32, vec![Argument::sdst(1), Argument::ssrc(0)]),
        )
        .unwrap();
        f.set_live_out(RegClass::Scalar, [0, 1]).unwrap();
        let mut pass = LivenessAnalysis::new(&f);
        pass.run();
        let graphs = ConflictGraphs::build(&pass).unwrap();
        assert_eq!(graphs.scalar.edge_count(), 0);
    }

    #[test]
    fn dump_names_edges() {
        let mut g = ConflictGraph::new(RegClass::Vector);
        g.add_node(0, 1).unwrap();
        g.add_node(4, 2).unwrap();
        g.add_neighbor(0, 4).unwrap();
        let mut text = String::new();
        g.dump(&mut text).unwrap();
        assert!(text.starts_with("vector conflict graph: 2 nodes, 1 edges"));
        assert!(text.contains("v4 (size 2, degree 1): v0"), "{text}");
    }
}
