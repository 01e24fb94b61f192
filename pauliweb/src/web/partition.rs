//! Web computation by divide and conquer.
//!
//! Every partition is cut out of the diagram with a fresh boundary node on each cut edge, its webs
//! are computed on their own, and the bases are zipped together partition by partition over the
//! shared cut edges.

use super::{compute_pauli_webs, PauliWebs};
use crate::diagram::{Diagram, EdgeId, NodeId, NodeType};
use crate::error::{Result, WebError};
use crate::pauli::PauliString;
use binar::{BitMatrix, Bitwise, EchelonForm};
use std::collections::{BTreeMap, BTreeSet};

/// A partition cut out of the diagram.
#[derive(Default)]
struct Part {
    webs: PauliWebs,
    /// Cut edges of the partition and the partition on their other side, if any.
    open_edges: BTreeMap<EdgeId, Option<usize>>,
}

/// Computes the webs of `diagram` partition by partition.
///
/// The partitions must be disjoint and together cover every non-boundary node. The resulting
/// bases span the same spaces as [`compute_pauli_webs`] on the whole diagram, with as many
/// detecting regions split off from the stabilizers as possible.
///
/// # Errors
///
/// Fails if the IO of `diagram` is virtual, if the partitions overlap, miss a node or contain a
/// boundary node, if a partition cannot be computed on its own, or if zipping two partitions does
/// not produce one stabilizer per remaining cut edge.
#[tracing::instrument(level = "debug", skip_all, fields(partitions = partitions.len()))]
pub fn pauli_webs_through_partitions(diagram: &Diagram, partitions: &[Vec<NodeId>]) -> Result<PauliWebs> {
    if diagram.is_io_virtual() {
        return Err(WebError::malformed_io("partitioned web computation needs real IO"));
    }
    if partitions.is_empty() {
        return Err(WebError::NoPartitions);
    }
    let owners = allocate(diagram, partitions)?;
    let mut parts = partitions
        .iter()
        .map(|nodes| cut_out(diagram, &nodes.iter().copied().collect(), &owners))
        .collect::<Result<Vec<Part>>>()?;

    let mut merged = vec![false; parts.len()];
    merged[0] = true;
    let mut current = std::mem::take(&mut parts[0].webs);
    let mut open_edges = std::mem::take(&mut parts[0].open_edges);
    loop {
        let next = open_edges
            .values()
            .flatten()
            .copied()
            .next()
            .or_else(|| merged.iter().position(|is_merged| !is_merged));
        let Some(next) = next else {
            break;
        };
        merged[next] = true;
        let shared: Vec<EdgeId> = open_edges
            .iter()
            .filter(|(_, owner)| **owner == Some(next))
            .map(|(edge, _)| *edge)
            .collect();
        for edge in &shared {
            open_edges.remove(edge);
        }
        let neighbor = std::mem::take(&mut parts[next]);
        open_edges.extend(
            neighbor
                .open_edges
                .into_iter()
                .filter(|(edge, _)| !shared.contains(edge)),
        );
        let boundary: Vec<EdgeId> = open_edges.keys().copied().collect();
        let zipped = zip_webs(&current.stabilizers, &neighbor.webs.stabilizers, &shared, &boundary)?;
        tracing::trace!(
            partition = next,
            shared = shared.len(),
            stabilizers = zipped.stabilizers.len(),
            regions = zipped.regions.len(),
            "zipped partition"
        );
        current.stabilizers = zipped.stabilizers;
        current.regions.extend(neighbor.webs.regions);
        current.regions.extend(zipped.regions);
    }
    Ok(current)
}

/// Maps every non-boundary node to its partition.
fn allocate(diagram: &Diagram, partitions: &[Vec<NodeId>]) -> Result<BTreeMap<NodeId, usize>> {
    let mut owners = BTreeMap::new();
    for (index, nodes) in partitions.iter().enumerate() {
        for node in nodes {
            if !diagram.contains_node(*node) {
                return Err(WebError::MissingNode(*node));
            }
            if diagram.node_type(*node) == NodeType::Boundary {
                return Err(WebError::UnsupportedNode {
                    node: *node,
                    node_type: NodeType::Boundary,
                });
            }
            if owners.insert(*node, index).is_some_and(|owner| owner != index) {
                return Err(WebError::OverlappingPartitions { node: *node });
            }
        }
    }
    if let Some(node) = diagram
        .node_indices()
        .find(|node| diagram.node_type(*node) != NodeType::Boundary && !owners.contains_key(node))
    {
        return Err(WebError::UnallocatedNode { node });
    }
    Ok(owners)
}

/// Extracts a partition with one new boundary per cut edge and computes its webs in terms of the
/// edges of `diagram`.
fn cut_out(diagram: &Diagram, nodes: &BTreeSet<NodeId>, owners: &BTreeMap<NodeId, usize>) -> Result<Part> {
    let (mut subgraph, node_map) = diagram.subgraph(nodes);
    let mut edge_map: BTreeMap<EdgeId, EdgeId> = BTreeMap::new();
    for (edge, source, target) in diagram.edge_list() {
        if let (Some(source), Some(target)) = (node_map.get(&source), node_map.get(&target)) {
            if let Some(sub_edge) = subgraph
                .edges_between(*source, *target)
                .into_iter()
                .find(|sub_edge| !edge_map.contains_key(sub_edge))
            {
                edge_map.insert(sub_edge, edge);
            }
        }
    }

    let mut open_edges = BTreeMap::new();
    for node in nodes {
        for edge in diagram.incident_edges(*node) {
            let Some(other) = diagram.opposite(edge, *node) else {
                continue;
            };
            if nodes.contains(&other) {
                continue;
            }
            let boundary = subgraph.add_node(NodeType::Boundary);
            let sub_edge = subgraph.add_edge(node_map[node], boundary);
            edge_map.insert(sub_edge, edge);
            open_edges.insert(edge, owners.get(&other).copied());
        }
    }
    subgraph.infer_io_from_boundaries();

    let webs = compute_pauli_webs(&subgraph)?;
    let relabel = |web: PauliString| web.remapped(|edge| edge_map.get(&edge).copied().unwrap_or(edge));
    Ok(Part {
        webs: PauliWebs {
            stabilizers: webs.stabilizers.into_iter().map(relabel).collect(),
            regions: webs.regions.into_iter().map(relabel).collect(),
        },
        open_edges,
    })
}

/// Combines the stabilizers of two adjacent pieces whose labels agree on the shared edges.
///
/// Combinations are rebased so that their images on the remaining open edges are in echelon
/// form, which makes every combination that vanishes there a separate detecting region.
fn zip_webs(
    current: &[PauliString],
    next: &[PauliString],
    shared: &[EdgeId],
    boundary: &[EdgeId],
) -> Result<PauliWebs> {
    if current.is_empty() && next.is_empty() {
        return Ok(PauliWebs::default());
    }
    let index_map = |edges: &[EdgeId]| -> BTreeMap<EdgeId, usize> {
        edges.iter().enumerate().map(|(index, edge)| (*edge, index)).collect()
    };
    let shared_map = index_map(shared);
    let boundary_map = index_map(boundary);
    let all: Vec<&PauliString> = current.iter().chain(next).collect();

    let shared_compiled = BitMatrix::from_row_iter(all.iter().map(|web| web.compile(&shared_map)), 2 * shared.len());
    let matchings = shared_compiled.transposed().kernel();
    let boundary_compiled =
        BitMatrix::from_row_iter(all.iter().map(|web| web.compile(&boundary_map)), 2 * boundary.len());
    let images = &matchings * &boundary_compiled;
    let rebased = &EchelonForm::new(images).transform * &matchings;

    let shared_set: BTreeSet<EdgeId> = shared.iter().copied().collect();
    let boundary_set: BTreeSet<EdgeId> = boundary.iter().copied().collect();
    let mut zipped = PauliWebs::default();
    for combination in rebased.rows() {
        let mut web = PauliString::new();
        for index in combination.support().take_while(|index| *index < current.len()) {
            web *= &current[index];
        }
        let shared_labels = web.restrict(&shared_set);
        for index in combination.support().filter(|index| *index >= current.len()) {
            web *= &next[index - current.len()];
        }
        web *= &shared_labels;
        if web.restrict(&boundary_set).is_trivial() {
            zipped.regions.push(web);
        } else {
            zipped.stabilizers.push(web);
        }
    }

    if zipped.stabilizers.len() != boundary.len() {
        return Err(WebError::GluingMismatch {
            expected: boundary.len(),
            found: zipped.stabilizers.len(),
        });
    }
    Ok(zipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(length: usize) -> (Diagram, Vec<NodeId>) {
        let mut diagram = Diagram::new();
        let input = diagram.add_node(NodeType::Boundary);
        let spiders: Vec<NodeId> = (0..length)
            .map(|index| {
                diagram.add_node(if index % 2 == 0 {
                    NodeType::Z
                } else {
                    NodeType::X
                })
            })
            .collect();
        let output = diagram.add_node(NodeType::Boundary);
        diagram.add_edge(input, spiders[0]);
        for window in spiders.windows(2) {
            diagram.add_edge(window[0], window[1]);
        }
        diagram.add_edge(spiders[length - 1], output);
        diagram.set_io(vec![input], vec![output], false).unwrap();
        (diagram, spiders)
    }

    #[test]
    fn partitions_must_be_disjoint_and_complete() {
        let (diagram, spiders) = path(3);
        assert_eq!(
            pauli_webs_through_partitions(&diagram, &[vec![spiders[0], spiders[1]], vec![spiders[1], spiders[2]]])
                .unwrap_err(),
            WebError::OverlappingPartitions { node: spiders[1] }
        );
        assert_eq!(
            pauli_webs_through_partitions(&diagram, &[vec![spiders[0], spiders[1]]]).unwrap_err(),
            WebError::UnallocatedNode { node: spiders[2] }
        );
        assert_eq!(
            pauli_webs_through_partitions(&diagram, &[]).unwrap_err(),
            WebError::NoPartitions
        );
    }

    #[test]
    fn path_zips_into_two_stabilizers() {
        let (diagram, spiders) = path(4);
        let partitions: Vec<Vec<NodeId>> = spiders.iter().map(|spider| vec![*spider]).collect();
        let webs = pauli_webs_through_partitions(&diagram, &partitions).unwrap();
        assert_eq!(webs.stabilizers.len(), 2);
        assert!(webs.regions.is_empty());
        let boundary = diagram.boundary_edges();
        for stabilizer in &webs.stabilizers {
            assert!(!stabilizer.restrict(&boundary).is_trivial());
        }
    }
}
