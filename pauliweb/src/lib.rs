//! Pauli webs of Clifford ZX diagrams.
//!
//! A Pauli web labels the edges of a diagram with Paulis such that every spider is stabilized.
//! [`compute_pauli_webs`] finds a basis of stabilizing webs and detecting regions, and
//! [`FlipOperators`] pairs every basis element with a single-edge Pauli that flips it alone.

pub mod diagram;
pub mod error;
pub mod flip;
pub mod generate;
pub mod pauli;
pub mod web;

pub use diagram::{Diagram, EdgeId, NodeId, NodeType, Phase, PositionedDiagram};
pub use error::{Result, WebError};
pub use flip::{FlipOperators, RegionFlips};
pub use pauli::{All, Pauli, PauliParseError, PauliString};
pub use web::{
    compute_detecting_regions, compute_pauli_webs, compute_stabilizers, pauli_webs_through_partitions, PauliWebs,
};
