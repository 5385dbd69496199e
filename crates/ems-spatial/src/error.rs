//! Spatial-subsystem error type.

use thiserror::Error;

use ems_core::{NodeId, NodeKind};

/// Errors produced by `ems-spatial`.
///
/// `NoRoute` is the routine "infeasible" answer of the routing oracle; the
/// dispatcher recovers from it locally.  Everything else indicates bad input.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("no node labelled {0:?}")]
    UnknownLabel(String),

    #[error("duplicate node label {0:?}")]
    DuplicateLabel(String),

    #[error("node {node} is a {found}, expected a {expected}")]
    WrongKind {
        node:     NodeId,
        expected: NodeKind,
        found:    NodeKind,
    },

    #[error("route ending at {end} cannot be joined to route starting at {start}")]
    DisjointRoutes { end: NodeId, start: NodeId },

    #[error("graph parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
