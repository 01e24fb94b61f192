use crate::diagram::{NodeId, NodeType};
use num_rational::Rational64;
use thiserror::Error;

/// Errors raised while building diagrams or computing Pauli webs on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebError {
    #[error("diagram has parallel edges between nodes {0} and {1}")]
    ParallelEdges(NodeId, NodeId),

    #[error("node {node} has phase {phase}π, only multiples of π/2 are Clifford")]
    NonClifford { node: NodeId, phase: Rational64 },

    #[error("node {node} of type {node_type} is not supported here")]
    UnsupportedNode { node: NodeId, node_type: NodeType },

    #[error("node {0} does not exist")]
    MissingNode(NodeId),

    #[error("malformed IO: {0}")]
    MalformedIo(String),

    #[error("boundary nodes and boundary edges are not allocated one-to-one")]
    BoundaryAllocation,

    #[error("generator {generator} has no Pauli on the edges a flip operator may act on")]
    NoFlipOperator { generator: usize },

    #[error("could not solve for {0}")]
    SolveFailure(String),

    #[error("expected {expected} stabilizers after gluing but found {found}")]
    GluingMismatch { expected: usize, found: usize },

    #[error("node {node} appears in more than one partition")]
    OverlappingPartitions { node: NodeId },

    #[error("node {node} is not in any partition")]
    UnallocatedNode { node: NodeId },

    #[error("no partitions given")]
    NoPartitions,

    #[error("expected {expected} operators but got {found}")]
    OperatorCount { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, WebError>;

impl WebError {
    pub fn malformed_io(message: impl Into<String>) -> WebError {
        WebError::MalformedIo(message.into())
    }

    pub fn solve_failure(what: impl std::fmt::Display) -> WebError {
        WebError::SolveFailure(what.to_string())
    }
}
