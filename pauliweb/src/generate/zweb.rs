use crate::diagram::{Diagram, NodeId, NodeType, PositionedDiagram};

/// A `qubits` by `depth` grid of Z spiders between a row of inputs and a row of outputs.
///
/// Spiders are connected to their neighbours along each qubit line and across each layer, so every
/// rectangle of spiders bounds a detecting region for X flips. The IO is real, in qubit order.
///
/// # Panics
///
/// Panics if `qubits` is zero.
#[must_use]
pub fn zweb(qubits: usize, depth: usize) -> Diagram {
    assert!(qubits > 0, "a zweb needs at least one qubit");
    let mut diagram = Diagram::new();
    let mut add_row = |node_type: NodeType, row: usize| -> Vec<NodeId> {
        (0..qubits)
            .map(|qubit| {
                let node = diagram.add_node(node_type);
                diagram.set_position(node, row as f64, qubit as f64);
                node
            })
            .collect()
    };
    let mut rows = vec![add_row(NodeType::Boundary, 0)];
    rows.extend((0..depth).map(|layer| add_row(NodeType::Z, layer + 1)));
    rows.push(add_row(NodeType::Boundary, depth + 1));

    for pair in rows.windows(2) {
        for (lower, upper) in pair[0].iter().zip(&pair[1]) {
            diagram.add_edge(*lower, *upper);
        }
    }
    for layer in &rows[1..=depth] {
        for neighbors in layer.windows(2) {
            diagram.add_edge(neighbors[0], neighbors[1]);
        }
    }

    let outputs = rows.pop().unwrap_or_default();
    let inputs = rows.swap_remove(0);
    // Every boundary is listed exactly once.
    let _ = diagram.set_io(inputs, outputs, false);
    diagram
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_shape() {
        let diagram = zweb(3, 2);
        assert_eq!(diagram.node_count(), 12);
        assert_eq!(diagram.edge_count(), 9 + 4);
        assert_eq!(diagram.boundary_nodes().len(), 6);
        let (inputs, outputs) = diagram.io().unwrap();
        assert_eq!((inputs.len(), outputs.len()), (3, 3));
        assert!(!diagram.has_parallel_edges());
    }
}
