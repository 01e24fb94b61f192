use crate::diagram::{Diagram, NodeId, NodeType, Phase, PositionedDiagram};
use rand::seq::SliceRandom;
use rand::Rng;

/// A random Clifford diagram on `qubits` inputs and outputs with `spiders` internal spiders.
///
/// Every boundary sits behind its own Z spider. Internal spiders are Z or X with a random multiple
/// of π/2, and `2 * spiders` random connections are made between distinct spiders, about a third
/// of them through a Hadamard box. With probability one half an input or an output is dropped, so
/// the diagram need not be unitary. IO is real.
///
/// # Panics
///
/// Panics if `qubits` is zero.
pub fn random_clifford(rng: &mut impl Rng, qubits: usize, spiders: usize) -> Diagram {
    assert!(qubits > 0);
    let mut diagram = Diagram::new();
    let add = |diagram: &mut Diagram, node_type: NodeType, phase: Phase, x: f64, y: f64| {
        let node = diagram.add_node_with_phase(node_type, phase);
        diagram.set_position(node, x, y);
        node
    };

    let mut inputs = Vec::with_capacity(qubits);
    let mut outputs = Vec::with_capacity(qubits);
    let mut all_spiders = Vec::with_capacity(2 * qubits + spiders);
    for qubit in 0..qubits {
        let row = qubit as f64;
        let input = add(&mut diagram, NodeType::Boundary, Phase::default(), 0.0, row);
        let output = add(&mut diagram, NodeType::Boundary, Phase::default(), 1.0, row);
        let input_spider = add(&mut diagram, NodeType::Z, Phase::default(), 0.1, row);
        let output_spider = add(&mut diagram, NodeType::Z, Phase::default(), 0.9, row);
        diagram.add_edge(input, input_spider);
        diagram.add_edge(output_spider, output);
        inputs.push(input);
        outputs.push(output);
        all_spiders.push(input_spider);
        all_spiders.push(output_spider);
    }
    for _ in 0..spiders {
        let node_type = if rng.gen_bool(0.5) { NodeType::Z } else { NodeType::X };
        let phase = Phase::new(rng.gen_range(0..4), 2);
        let row = rng.gen_range(0..qubits) as f64;
        all_spiders.push(add(&mut diagram, node_type, phase, 0.5, row));
    }

    for _ in 0..2 * spiders {
        let chosen: Vec<NodeId> = all_spiders.choose_multiple(rng, 2).copied().collect();
        let [first, second] = chosen[..] else {
            continue;
        };
        if rng.gen_bool(0.3) {
            let hadamard = diagram.add_node(NodeType::H);
            diagram.add_edge(first, hadamard);
            diagram.add_edge(hadamard, second);
        } else if diagram.edges_between(first, second).is_empty() {
            diagram.add_edge(first, second);
        }
    }

    if rng.gen_bool(0.5) {
        let removable = if rng.gen_bool(0.5) { &mut outputs } else { &mut inputs };
        let index = rng.gen_range(0..removable.len());
        diagram.remove_node(removable.remove(index));
    }
    // Every remaining boundary is listed exactly once.
    let _ = diagram.set_io(inputs, outputs, false);
    diagram
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_diagrams_are_simple_clifford_graphs() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let diagram = random_clifford(&mut rng, 3, 8);
            assert!(!diagram.has_parallel_edges());
            assert!(diagram.has_io());
            let boundaries = diagram.boundary_nodes().len();
            assert!(boundaries == 5 || boundaries == 6);
            for node in diagram.node_indices() {
                assert!(*diagram.phase(node).denom() <= 2);
            }
        }
    }
}
