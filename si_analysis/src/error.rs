// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use si_isa::RegClass;

use crate::conflict::NodeState;
use crate::ir::BlockId;

/// Errors raised while editing or querying a conflict graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// A node was asked to neighbor itself.
    SelfEdge {
        /// The offending node.
        node: u32,
    },
    /// The edge is already present.
    DuplicateEdge {
        /// First endpoint.
        a: u32,
        /// Second endpoint.
        b: u32,
    },
    /// The edge to remove is not present.
    MissingEdge {
        /// First endpoint.
        a: u32,
        /// Second endpoint.
        b: u32,
    },
    /// No node has this id.
    UnknownNode {
        /// The requested id.
        id: u32,
    },
    /// The requested transition is not legal from the node's current state.
    BadState {
        /// The node.
        id: u32,
        /// Its state at the time of the request.
        state: NodeState,
    },
    /// Conflict graphs were requested before liveness was computed.
    MissingLiveness {
        /// First block without liveness information.
        block: BlockId,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfEdge { node } => write!(f, "node {node} cannot neighbor itself"),
            Self::DuplicateEdge { a, b } => write!(f, "edge already present: {a} <-> {b}"),
            Self::MissingEdge { a, b } => write!(f, "edge not present: {a} <-> {b}"),
            Self::UnknownNode { id } => write!(f, "unknown conflict graph node: {id}"),
            Self::BadState { id, state } => {
                write!(f, "illegal transition for node {id} in state {state:?}")
            }
            Self::MissingLiveness { block } => {
                write!(f, "no liveness information for block {}", block.index())
            }
        }
    }
}

impl core::error::Error for GraphError {}

/// Errors raised while building a [`Function`](crate::Function).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CfgError {
    /// A block id did not name a block of the function.
    BadBlockId {
        /// The offending id.
        block: BlockId,
    },
    /// A register argument exceeded the declared register count of its class.
    RegisterOutOfRange {
        /// Register class.
        class: RegClass,
        /// Highest register named by the argument.
        id: u32,
        /// Declared register count.
        count: u32,
    },
    /// A register series with `low > high`.
    EmptySeries {
        /// Register class.
        class: RegClass,
        /// Low end.
        low: u32,
        /// High end.
        high: u32,
    },
}

impl fmt::Display for CfgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadBlockId { block } => write!(f, "bad block id: {}", block.index()),
            Self::RegisterOutOfRange { class, id, count } => write!(
                f,
                "register {}{id} out of range: function declares {count}",
                class.prefix()
            ),
            Self::EmptySeries { class, low, high } => {
                let p = class.prefix();
                write!(f, "empty register series {p}[{low}:{high}]")
            }
        }
    }
}

impl core::error::Error for CfgError {}
