//! Pauli webs of Clifford ZX diagrams.
//!
//! The web space is computed on a red-green copy of the diagram as the null space of the firing
//! verification matrix, split into stabilizing webs (non-trivial on the boundary) and detecting
//! regions (trivial on the boundary), and pulled back onto the edges of the input diagram.

pub mod firing;
pub mod partition;
pub mod red_green;

use crate::diagram::{Diagram, NodeId};
use crate::error::{Result, WebError};
use crate::pauli::PauliString;
use binar::{BitMatrix, BitVec};
use firing::FiringOrdering;
use red_green::{to_red_green_form, PairWeb, RedGreenForm};

pub use partition::pauli_webs_through_partitions;

/// The endpoints of an edge, smaller node first.
pub type NodePair = (NodeId, NodeId);

/// A basis of the web space of a diagram, keyed by the diagram's edge ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PauliWebs {
    pub stabilizers: Vec<PauliString>,
    pub regions: Vec<PauliString>,
}

/// Computes stabilizing webs and detecting regions of `diagram`.
///
/// Stabilizers restricted to the boundary edges are independent, and regions are trivial on the
/// boundary and independent.
///
/// ```
/// use pauliweb::{compute_pauli_webs, Diagram, NodeType, PauliString, Pauli};
/// use std::collections::BTreeSet;
///
/// let mut diagram = Diagram::new();
/// let input = diagram.add_node(NodeType::Boundary);
/// let spider = diagram.add_node(NodeType::Z);
/// let output = diagram.add_node(NodeType::Boundary);
/// let first = diagram.add_edge(input, spider);
/// let second = diagram.add_edge(spider, output);
///
/// let webs = compute_pauli_webs(&diagram).unwrap();
/// assert!(webs.regions.is_empty());
/// let xx: PauliString = [(first, Pauli::X), (second, Pauli::X)].into_iter().collect();
/// let zz: PauliString = [(first, Pauli::Z), (second, Pauli::Z)].into_iter().collect();
/// let stabilizers: BTreeSet<PauliString> = webs.stabilizers.into_iter().collect();
/// assert_eq!(stabilizers, BTreeSet::from([xx, zz]));
/// ```
///
/// # Errors
///
/// Fails if the diagram has parallel edges, non-Clifford phases, unsupported nodes or boundary
/// nodes without exactly one neighbour.
pub fn compute_pauli_webs(diagram: &Diagram) -> Result<PauliWebs> {
    let computation = WebComputation::new(diagram)?;
    Ok(PauliWebs {
        stabilizers: computation.stabilizers()?,
        regions: computation.regions()?,
    })
}

/// The stabilizing webs of [`compute_pauli_webs`] alone.
///
/// # Errors
///
/// See [`compute_pauli_webs`].
pub fn compute_stabilizers(diagram: &Diagram) -> Result<Vec<PauliString>> {
    WebComputation::new(diagram)?.stabilizers()
}

/// The detecting regions of [`compute_pauli_webs`] alone.
///
/// # Errors
///
/// See [`compute_pauli_webs`].
pub fn compute_detecting_regions(diagram: &Diagram) -> Result<Vec<PauliString>> {
    WebComputation::new(diagram)?.regions()
}

struct WebComputation<'a> {
    original: &'a Diagram,
    form: RedGreenForm,
    ordering: FiringOrdering,
    /// Basis of the firing assignment space, one assignment per row.
    solutions: BitMatrix,
    /// Coordinates `0..2B` of every assignment, one assignment per column.
    boundary_selected: BitMatrix,
}

impl<'a> WebComputation<'a> {
    #[tracing::instrument(level = "debug", skip_all, fields(nodes = original.node_count(), edges = original.edge_count()))]
    fn new(original: &'a Diagram) -> Result<Self> {
        let form = to_red_green_form(original)?;
        let ordering = FiringOrdering::new(&form.diagram)?;
        let solutions = ordering.verification_matrix(&form.diagram).kernel();
        let boundary_columns = 2 * ordering.boundary_count();
        let boundary_selected = solutions
            .transposed()
            .submatrix(0..boundary_columns, 0..solutions.row_count());
        tracing::debug!(
            rewrites = form.log.len(),
            boundaries = ordering.boundary_count(),
            spiders = ordering.spider_count(),
            dimension = solutions.row_count(),
            "firing assignment space computed"
        );
        Ok(WebComputation {
            original,
            form,
            ordering,
            solutions,
            boundary_selected,
        })
    }

    fn stabilizers(&self) -> Result<Vec<PauliString>> {
        let pivots = self.boundary_selected.clone().echelonize();
        pivots
            .into_iter()
            .map(|pivot| self.to_original(self.solutions.row(pivot)))
            .collect()
    }

    fn regions(&self) -> Result<Vec<PauliString>> {
        // An empty null space means there are no regions at all.
        let combinations = self.boundary_selected.kernel();
        combinations
            .rows()
            .map(|combination| self.to_original(&self.solutions.right_multiply(combination)))
            .collect()
    }

    fn to_original(&self, assignment: &BitVec) -> Result<PauliString> {
        let web: PairWeb = self.form.pull_back(self.ordering.web(&self.form.diagram, assignment))?;
        web.into_iter()
            .map(|((first, second), pauli)| match self.original.edges_between(first, second).first() {
                Some(edge) => Ok((*edge, pauli)),
                None => Err(WebError::solve_failure(format!(
                    "an edge between nodes {first} and {second} of the input diagram"
                ))),
            })
            .collect()
    }
}
