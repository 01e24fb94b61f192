//! Rewriting into red-green form.
//!
//! The normalized diagram only contains boundary nodes and Clifford Z and X spiders, adjacent
//! spiders alternate in colour, and every boundary hangs off its own phase-free Z spider. Every
//! inserted node is logged so that webs found on the normalized diagram can be pulled back onto
//! the edges of the input.

use super::NodePair;
use crate::diagram::{Diagram, NodeId, NodeType, Phase};
use crate::error::{Result, WebError};
use crate::pauli::Pauli;
use num_traits::Zero;
use std::collections::{BTreeMap, BTreeSet};

/// Colours of the three spiders replacing a Hadamard box, listed from its lower neighbour.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EulerPattern {
    Xzx,
    Zxz,
}

impl EulerPattern {
    fn colors(self) -> [NodeType; 3] {
        match self {
            EulerPattern::Xzx => [NodeType::X, NodeType::Z, NodeType::X],
            EulerPattern::Zxz => [NodeType::Z, NodeType::X, NodeType::Z],
        }
    }
}

/// One reversible rewrite step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// A phase-free two-legged spider placed on an existing edge.
    IdentityInsertion { node: NodeId },
    /// A Hadamard box replaced by a chain of three π/2 spiders. The box itself became the middle
    /// spider, `first` and `last` are new.
    HadamardExpansion {
        first: NodeId,
        origin: NodeId,
        last: NodeId,
        pattern: EulerPattern,
    },
}

/// A diagram in red-green form together with the rewrites that produced it.
#[derive(Debug, Clone)]
pub struct RedGreenForm {
    pub diagram: Diagram,
    pub log: Vec<Rewrite>,
}

/// Web labels keyed by the (ordered) endpoints of an edge.
pub type PairWeb = BTreeMap<NodePair, Pauli>;

pub(crate) fn pair(first: NodeId, second: NodeId) -> NodePair {
    (first.min(second), first.max(second))
}

/// Replaces the edge between `first` and `second` by a path through a new node.
fn place_between(diagram: &mut Diagram, node_type: NodeType, first: NodeId, second: NodeId) -> NodeId {
    let node = diagram.add_node(node_type);
    for edge in diagram.edges_between(first, second) {
        diagram.remove_edge(edge);
    }
    diagram.add_edge(first, node);
    diagram.add_edge(node, second);
    node
}

/// Copies `diagram` and rewrites the copy into red-green form.
///
/// # Errors
///
/// Returns [`WebError::ParallelEdges`] if the input has parallel edges,
/// [`WebError::UnsupportedNode`] for Hadamard boxes without exactly two legs and
/// [`WebError::NonClifford`] for phases that are not multiples of π/2.
pub fn to_red_green_form(diagram: &Diagram) -> Result<RedGreenForm> {
    if let Some((first, second)) = diagram.parallel_edge() {
        return Err(WebError::ParallelEdges(first, second));
    }
    let mut normalized = diagram.clone();
    let mut log = expand_hadamards(&mut normalized)?;
    verify_clifford(&normalized)?;
    log.extend(
        ensure_red_green(&mut normalized)
            .into_iter()
            .map(|node| Rewrite::IdentityInsertion { node }),
    );
    Ok(RedGreenForm { diagram: normalized, log })
}

fn expand_hadamards(diagram: &mut Diagram) -> Result<Vec<Rewrite>> {
    let hadamards: Vec<NodeId> = diagram
        .node_indices()
        .filter(|node| diagram.node_type(*node) == NodeType::H)
        .collect();
    let mut log = Vec::with_capacity(hadamards.len());
    for origin in hadamards {
        let [left, right] = diagram.neighbors(origin)[..] else {
            return Err(WebError::UnsupportedNode {
                node: origin,
                node_type: NodeType::H,
            });
        };
        let pattern = if diagram.node_type(left) == NodeType::X && diagram.node_type(right) == NodeType::X {
            EulerPattern::Xzx
        } else {
            EulerPattern::Zxz
        };
        let [first_color, middle_color, last_color] = pattern.colors();
        let half = Phase::new(1, 2);
        diagram.set_node_type(origin, middle_color);
        diagram.set_phase(origin, half);
        let first = place_between(diagram, first_color, left, origin);
        diagram.set_phase(first, half);
        let last = place_between(diagram, last_color, origin, right);
        diagram.set_phase(last, half);
        log.push(Rewrite::HadamardExpansion {
            first,
            origin,
            last,
            pattern,
        });
    }
    Ok(log)
}

fn verify_clifford(diagram: &Diagram) -> Result<()> {
    for node in diagram.node_indices() {
        let node_type = diagram.node_type(node);
        if !matches!(node_type, NodeType::Boundary | NodeType::Z | NodeType::X) {
            return Err(WebError::UnsupportedNode { node, node_type });
        }
        let phase = diagram.phase(node);
        if *phase.denom() > 2 {
            return Err(WebError::NonClifford { node, phase });
        }
    }
    Ok(())
}

fn ensure_red_green(diagram: &mut Diagram) -> Vec<NodeId> {
    let mut inserted = Vec::new();
    let same_colored: Vec<(NodeId, NodeId)> = diagram
        .edge_list()
        .filter(|(_, source, target)| diagram.node_type(*source) == diagram.node_type(*target))
        .map(|(_, source, target)| (source, target))
        .collect();
    for (source, target) in same_colored {
        let color = diagram.node_type(source).opposite_color().unwrap_or(NodeType::X);
        inserted.push(place_between(diagram, color, source, target));
    }

    let boundaries = diagram.boundary_nodes();
    for boundary in &boundaries {
        if let Some(neighbor) = diagram.neighbors(*boundary).first().copied() {
            if diagram.node_type(neighbor) == NodeType::X {
                inserted.push(place_between(diagram, NodeType::Z, *boundary, neighbor));
            }
        }
    }

    for boundary in &boundaries {
        let Some(neighbor) = diagram.neighbors(*boundary).first().copied() else {
            continue;
        };
        let boundary_neighbors = diagram
            .neighbors(neighbor)
            .into_iter()
            .filter(|node| diagram.node_type(*node) == NodeType::Boundary)
            .count();
        if !diagram.phase(neighbor).is_zero() || boundary_neighbors > 1 {
            let spacer = place_between(diagram, NodeType::X, *boundary, neighbor);
            inserted.push(spacer);
            inserted.push(place_between(diagram, NodeType::Z, *boundary, spacer));
        }
    }
    inserted
}

impl RedGreenForm {
    /// Pulls a web on the normalized diagram back onto the node pairs of the input diagram.
    ///
    /// The log is replayed backwards: an identity spider passes its label straight through, and
    /// the outer legs of an expanded Hadamard become the two legs of the box.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::SolveFailure`] if a logged rewrite no longer matches the neighbourhood
    /// it was recorded with.
    pub fn pull_back(&self, mut web: PairWeb) -> Result<PairWeb> {
        let mut adjacency: BTreeMap<NodeId, BTreeSet<NodeId>> = self
            .diagram
            .node_indices()
            .map(|node| (node, self.diagram.neighbors(node).into_iter().collect()))
            .collect();
        let disconnect = |adjacency: &mut BTreeMap<NodeId, BTreeSet<NodeId>>, first: NodeId, second: NodeId| {
            if let Some(neighbors) = adjacency.get_mut(&first) {
                neighbors.remove(&second);
            }
            if let Some(neighbors) = adjacency.get_mut(&second) {
                neighbors.remove(&first);
            }
        };
        let connect = |adjacency: &mut BTreeMap<NodeId, BTreeSet<NodeId>>, first: NodeId, second: NodeId| {
            adjacency.entry(first).or_default().insert(second);
            adjacency.entry(second).or_default().insert(first);
        };
        let other_neighbor = |adjacency: &BTreeMap<NodeId, BTreeSet<NodeId>>, node: NodeId, excluded: NodeId| {
            adjacency
                .get(&node)
                .and_then(|neighbors| neighbors.iter().copied().find(|neighbor| *neighbor != excluded))
        };

        for rewrite in self.log.iter().rev() {
            match rewrite {
                Rewrite::IdentityInsertion { node } => {
                    let neighbors: Vec<NodeId> = adjacency.get(node).into_iter().flatten().copied().collect();
                    let [first, second] = neighbors[..] else {
                        return Err(WebError::solve_failure(format!(
                            "the two legs of identity spider {node}, found {}",
                            neighbors.len()
                        )));
                    };
                    let label = web.remove(&pair(first, *node)).unwrap_or_default();
                    web.remove(&pair(*node, second));
                    insert_label(&mut web, pair(first, second), label);
                    disconnect(&mut adjacency, first, *node);
                    disconnect(&mut adjacency, *node, second);
                    connect(&mut adjacency, first, second);
                }
                Rewrite::HadamardExpansion {
                    first, origin, last, ..
                } => {
                    let (Some(left), Some(right)) = (
                        other_neighbor(&adjacency, *first, *origin),
                        other_neighbor(&adjacency, *last, *origin),
                    ) else {
                        return Err(WebError::solve_failure(format!(
                            "the outer legs of the Hadamard chain through node {origin}"
                        )));
                    };
                    let left_label = web.remove(&pair(left, *first)).unwrap_or_default();
                    let right_label = web.remove(&pair(*last, right)).unwrap_or_default();
                    web.remove(&pair(*first, *origin));
                    web.remove(&pair(*origin, *last));
                    insert_label(&mut web, pair(left, *origin), left_label);
                    insert_label(&mut web, pair(*origin, right), right_label);
                    disconnect(&mut adjacency, left, *first);
                    disconnect(&mut adjacency, *first, *origin);
                    disconnect(&mut adjacency, *origin, *last);
                    disconnect(&mut adjacency, *last, right);
                    connect(&mut adjacency, left, *origin);
                    connect(&mut adjacency, *origin, right);
                }
            }
        }
        Ok(web)
    }
}

fn insert_label(web: &mut PairWeb, key: NodePair, label: Pauli) {
    if label == Pauli::I {
        web.remove(&key);
    } else {
        web.insert(key, label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_red_green(diagram: &Diagram) -> bool {
        diagram.edge_list().all(|(_, source, target)| {
            let (source_type, target_type) = (diagram.node_type(source), diagram.node_type(target));
            source_type != target_type && source_type != NodeType::H && target_type != NodeType::H
        }) && diagram.boundary_nodes().into_iter().all(|boundary| {
            let neighbors = diagram.neighbors(boundary);
            neighbors.len() == 1
                && diagram.node_type(neighbors[0]) == NodeType::Z
                && diagram.phase(neighbors[0]).is_zero()
                && diagram
                    .neighbors(neighbors[0])
                    .into_iter()
                    .filter(|node| diagram.node_type(*node) == NodeType::Boundary)
                    .count()
                    == 1
        })
    }

    #[test]
    fn wire_between_boundaries_gets_three_spiders() {
        let mut diagram = Diagram::new();
        let input = diagram.add_node(NodeType::Boundary);
        let output = diagram.add_node(NodeType::Boundary);
        diagram.add_edge(input, output);
        let form = to_red_green_form(&diagram).unwrap();
        assert!(is_red_green(&form.diagram));
        assert_eq!(form.log.len(), 3);
        assert_eq!(diagram.node_count(), 2);
    }

    #[test]
    fn hadamard_becomes_pi_half_chain() {
        let mut diagram = Diagram::new();
        let input = diagram.add_node(NodeType::Boundary);
        let left = diagram.add_node(NodeType::Z);
        let hadamard = diagram.add_node(NodeType::H);
        let right = diagram.add_node(NodeType::Z);
        let output = diagram.add_node(NodeType::Boundary);
        diagram.add_edge(input, left);
        diagram.add_edge(left, hadamard);
        diagram.add_edge(hadamard, right);
        diagram.add_edge(right, output);

        let form = to_red_green_form(&diagram).unwrap();
        assert!(is_red_green(&form.diagram));
        let Rewrite::HadamardExpansion {
            first, origin, last, pattern,
        } = form.log[0]
        else {
            panic!("expected a Hadamard expansion first");
        };
        assert_eq!(origin, hadamard);
        assert_eq!(pattern, EulerPattern::Zxz);
        assert_eq!(form.diagram.node_type(origin), NodeType::X);
        for node in [first, origin, last] {
            assert_eq!(form.diagram.phase(node), Phase::new(1, 2));
        }
        assert_eq!(form.diagram.neighbors(origin), vec![first, last]);
    }

    #[test]
    fn pull_back_collapses_chains() {
        let mut diagram = Diagram::new();
        let input = diagram.add_node(NodeType::Boundary);
        let hadamard = diagram.add_node(NodeType::H);
        let spider = diagram.add_node(NodeType::X);
        let output = diagram.add_node(NodeType::Boundary);
        diagram.add_edge(input, hadamard);
        diagram.add_edge(hadamard, spider);
        diagram.add_edge(spider, output);
        let form = to_red_green_form(&diagram).unwrap();
        assert!(is_red_green(&form.diagram));

        let web: PairWeb = form
            .diagram
            .edge_list()
            .map(|(_, source, target)| (pair(source, target), Pauli::Y))
            .collect();
        let pulled = form.pull_back(web).unwrap();
        let expected: BTreeSet<NodePair> = diagram
            .edge_list()
            .map(|(_, source, target)| pair(source, target))
            .collect();
        assert_eq!(pulled.keys().copied().collect::<BTreeSet<_>>(), expected);
    }

    #[test]
    fn pull_back_rejects_rewrites_that_do_not_match_the_diagram() {
        let mut diagram = Diagram::new();
        let input = diagram.add_node(NodeType::Boundary);
        let spider = diagram.add_node(NodeType::Z);
        let output = diagram.add_node(NodeType::Boundary);
        diagram.add_edge(input, spider);
        diagram.add_edge(spider, output);
        let mut form = to_red_green_form(&diagram).unwrap();
        assert!(form.pull_back(PairWeb::new()).is_ok());

        form.log.push(Rewrite::IdentityInsertion { node: input });
        assert!(matches!(form.pull_back(PairWeb::new()), Err(WebError::SolveFailure(_))));

        let mut form = to_red_green_form(&diagram).unwrap();
        let neighbor = form.diagram.neighbors(input)[0];
        form.log.push(Rewrite::HadamardExpansion {
            first: input,
            origin: neighbor,
            last: input,
            pattern: EulerPattern::Zxz,
        });
        assert!(matches!(form.pull_back(PairWeb::new()), Err(WebError::SolveFailure(_))));
    }

    #[test]
    fn rejects_non_clifford_phases_and_parallel_edges() {
        let mut diagram = Diagram::new();
        let first = diagram.add_node_with_phase(NodeType::Z, Phase::new(1, 4));
        let second = diagram.add_node(NodeType::X);
        diagram.add_edge(first, second);
        assert_eq!(
            to_red_green_form(&diagram).unwrap_err(),
            WebError::NonClifford {
                node: first,
                phase: Phase::new(1, 4)
            }
        );
        diagram.set_phase(first, Phase::zero());
        diagram.add_edge(second, first);
        assert_eq!(to_red_green_form(&diagram).unwrap_err(), WebError::ParallelEdges(first, second));
    }
}
