//! Spider firing assignments on a red-green diagram.
//!
//! A firing assignment marks spiders as fired: a fired Z spider puts X on all its legs, a fired X
//! spider puts Z on all its legs. Together with one activation bit per boundary, which puts Z on
//! the boundary edge, this describes every Pauli web of the diagram.

use super::red_green::{pair, PairWeb};
use crate::diagram::{Diagram, NodeId, NodeType};
use crate::error::{Result, WebError};
use crate::pauli::Pauli;
use binar::{BitMatrix, BitVec, Bitwise};
use std::collections::BTreeMap;

/// Canonical order of the non-boundary nodes: the spiders next to boundaries, in boundary order,
/// then the remaining spiders with phase 0 or π, then the π/2 spiders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiringOrdering {
    /// `(spider, boundary)` for every boundary, in increasing boundary order.
    pub z_boundaries: Vec<(NodeId, NodeId)>,
    pub regular_spiders: Vec<NodeId>,
    pub pi_half_spiders: Vec<NodeId>,
    positions: BTreeMap<NodeId, usize>,
}

impl FiringOrdering {
    /// # Errors
    ///
    /// Returns [`WebError::BoundaryAllocation`] if a boundary node does not have exactly one
    /// neighbour or two boundaries share a neighbour.
    pub fn new(diagram: &Diagram) -> Result<FiringOrdering> {
        let mut z_boundaries = Vec::new();
        for boundary in diagram.boundary_nodes() {
            let [spider] = diagram.neighbors(boundary)[..] else {
                return Err(WebError::BoundaryAllocation);
            };
            z_boundaries.push((spider, boundary));
        }
        let mut positions: BTreeMap<NodeId, usize> = BTreeMap::new();
        for (spider, _) in &z_boundaries {
            let next = positions.len();
            if positions.insert(*spider, next).is_some() {
                return Err(WebError::BoundaryAllocation);
            }
        }
        let (pi_half_spiders, regular_spiders): (Vec<NodeId>, Vec<NodeId>) = diagram
            .node_indices()
            .filter(|node| diagram.node_type(*node) != NodeType::Boundary && !positions.contains_key(node))
            .partition(|node| *diagram.phase(*node).denom() == 2);
        for node in regular_spiders.iter().chain(&pi_half_spiders) {
            let next = positions.len();
            positions.insert(*node, next);
        }
        Ok(FiringOrdering {
            z_boundaries,
            regular_spiders,
            pi_half_spiders,
            positions,
        })
    }

    #[must_use]
    pub fn boundary_count(&self) -> usize {
        self.z_boundaries.len()
    }

    /// Number of ordered (non-boundary) nodes.
    #[must_use]
    pub fn spider_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.positions.get(&node).copied()
    }

    /// Ordered nodes with their positions.
    pub fn spiders(&self) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.positions.iter().map(|(node, position)| (*node, *position))
    }

    /// The matrix whose right null space is the space of firing assignments.
    ///
    /// Its `N` rows are the ordered spiders and its `B + N` columns are the boundary activations
    /// followed by the spider firings. The left block is the identity on the first `B` rows, the
    /// right block is the adjacency matrix of the spiders with the identity added on the π/2
    /// spiders.
    #[must_use]
    pub fn verification_matrix(&self, diagram: &Diagram) -> BitMatrix {
        let boundary_count = self.boundary_count();
        let spider_count = self.spider_count();
        let mut matrix = BitMatrix::zeros(spider_count, boundary_count + spider_count);
        for index in 0..boundary_count {
            matrix.set((index, index), true);
        }
        for (_, source, target) in diagram.edge_list() {
            if let (Some(source), Some(target)) = (self.position(source), self.position(target)) {
                matrix.negate((source, boundary_count + target));
                matrix.negate((target, boundary_count + source));
            }
        }
        let first_pi_half = spider_count - self.pi_half_spiders.len();
        for position in first_pi_half..spider_count {
            matrix.negate((position, boundary_count + position));
        }
        matrix
    }

    /// Translates a firing assignment into edge labels on `diagram`.
    ///
    /// # Panics
    ///
    /// Panics if `assignment` is shorter than the column count of the verification matrix.
    #[must_use]
    pub fn web(&self, diagram: &Diagram, assignment: &BitVec) -> PairWeb {
        let boundary_count = self.boundary_count();
        let mut web = PairWeb::new();
        let mut flip = |first: NodeId, second: NodeId, pauli: Pauli| {
            let label = web.entry(pair(first, second)).or_default();
            *label *= pauli;
        };
        for (node, position) in self.spiders() {
            if !assignment.index(boundary_count + position) {
                continue;
            }
            let pauli = match diagram.node_type(node) {
                NodeType::Z => Pauli::X,
                NodeType::X => Pauli::Z,
                NodeType::Boundary | NodeType::H => continue,
            };
            for neighbor in diagram.neighbors(node) {
                flip(node, neighbor, pauli);
            }
        }
        for (index, (spider, boundary)) in self.z_boundaries.iter().enumerate() {
            if assignment.index(index) {
                flip(*spider, *boundary, Pauli::Z);
            }
        }
        web.retain(|_, pauli| *pauli != Pauli::I);
        web
    }
}
