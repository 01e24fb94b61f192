use crate::diagram::{Diagram, NodeId, NodeType, Phase, PositionedDiagram};
use crate::error::Result;
use crate::pauli::{Pauli, PauliString};

/// A syndrome extraction diagram and a partition of its spiders.
#[derive(Debug, Clone)]
pub struct ShorExtraction {
    pub diagram: Diagram,
    /// One partition per round, or per stabilizer measurement when granular.
    pub partitions: Vec<Vec<NodeId>>,
}

/// Where a stabilizer measurement attaches to one data qubit line.
#[derive(Clone, Copy)]
struct Attachment {
    first: NodeId,
    last: NodeId,
    control: NodeId,
}

/// Measures `stabilisers` one by one, `repeat` times, with Shor-style cat state extraction.
///
/// Every stabilizer uses a fault-free cat state on `qubits` ancillas, post-selected on all-zero
/// outcomes. X and Y factors are conjugated into Z with Hadamard boxes and π/2 X spiders. The IO is
/// real: inputs then outputs, one per data qubit.
///
/// # Errors
///
/// Propagates IO allocation failures.
///
/// # Panics
///
/// Panics if a stabilizer acts on a qubit index `>= qubits`.
pub fn shor_extraction(
    stabilisers: &[PauliString],
    qubits: usize,
    repeat: usize,
    granular: bool,
) -> Result<ShorExtraction> {
    let mut diagram = Diagram::new();
    let mut column = 0.0;
    let mut current: Vec<NodeId> = (0..qubits)
        .map(|qubit| {
            let node = diagram.add_node(NodeType::Boundary);
            diagram.set_position(node, column, qubit as f64);
            node
        })
        .collect();
    let inputs = current.clone();
    column += 1.0;

    let mut partitions = Vec::new();
    for _ in 0..repeat {
        let mut round = Vec::new();
        for stabiliser in stabilisers {
            let (measurement, attachments) = measurement_gadget(stabiliser, qubits, &mut column);
            let connections: Vec<(NodeId, NodeId)> = attachments
                .iter()
                .enumerate()
                .filter_map(|(qubit, attachment)| attachment.map(|attachment| (current[qubit], attachment.first)))
                .collect();
            let node_map = diagram.compose(&measurement, &connections);
            for (qubit, attachment) in attachments.iter().enumerate() {
                if let Some(attachment) = attachment {
                    current[qubit] = node_map[&attachment.last];
                }
            }
            if granular {
                partitions.push(node_map.into_values().collect());
            } else {
                round.extend(node_map.into_values());
            }
        }
        if !granular {
            partitions.push(round);
        }
    }

    let outputs: Vec<NodeId> = current
        .iter()
        .enumerate()
        .map(|(qubit, node)| {
            let boundary = diagram.add_node(NodeType::Boundary);
            diagram.set_position(boundary, column, qubit as f64);
            diagram.add_edge(*node, boundary);
            boundary
        })
        .collect();
    diagram.set_io(inputs, outputs, false)?;
    Ok(ShorExtraction { diagram, partitions })
}

/// The measurement of a single stabilizer, with its attachment points per data qubit.
fn measurement_gadget(stabiliser: &PauliString, qubits: usize, column: &mut f64) -> (Diagram, Vec<Option<Attachment>>) {
    let mut gadget = Diagram::new();
    let ancilla_row = |index: usize| (qubits + 1 + index) as f64;
    let cat = gadget.add_node(NodeType::Z);
    gadget.set_position(cat, *column, (qubits + 2) as f64 + qubits as f64 / 2.0);
    *column += 1.0;

    let mut attachments: Vec<Option<Attachment>> = vec![None; qubits];
    for (qubit, pauli) in stabiliser.iter() {
        assert!(qubit < qubits, "stabiliser acts on qubit {qubit} of {qubits}");
        let row = qubit as f64;
        let target = gadget.add_node(NodeType::X);
        gadget.set_position(target, *column, row);
        let control = gadget.add_node(NodeType::Z);
        gadget.set_position(control, *column, ancilla_row(qubit));
        gadget.add_edge(target, control);

        let (first, last) = match pauli {
            Pauli::X => (gadget.add_node(NodeType::H), gadget.add_node(NodeType::H)),
            Pauli::Y => (
                gadget.add_node_with_phase(NodeType::X, Phase::new(1, 2)),
                gadget.add_node_with_phase(NodeType::X, Phase::new(-1, 2)),
            ),
            Pauli::Z | Pauli::I => (target, target),
        };
        if first != target {
            gadget.set_position(first, *column - 0.5, row);
            gadget.set_position(last, *column + 0.5, row);
            gadget.add_edge(target, first);
            gadget.add_edge(target, last);
        }
        attachments[qubit] = Some(Attachment { first, last, control });
        *column += 1.0;
    }

    for (index, attachment) in attachments.iter().enumerate() {
        let hadamard = gadget.add_node(NodeType::H);
        gadget.set_position(hadamard, *column, ancilla_row(index));
        let measurement = gadget.add_node(NodeType::X);
        gadget.set_position(measurement, *column + 1.0, ancilla_row(index));
        gadget.add_edge(hadamard, measurement);
        match attachment {
            Some(attachment) => {
                gadget.add_edge(cat, attachment.control);
                gadget.add_edge(attachment.control, hadamard);
            }
            None => {
                gadget.add_edge(cat, hadamard);
            }
        }
    }
    *column += 2.0;
    (gadget, attachments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::steane_code_stabilisers;

    #[test]
    fn partitions_cover_all_spiders() {
        let stabilisers = steane_code_stabilisers();
        for granular in [false, true] {
            let extraction = shor_extraction(&stabilisers, 7, 2, granular).unwrap();
            let expected = if granular { 12 } else { 2 };
            assert_eq!(extraction.partitions.len(), expected);
            let covered: usize = extraction.partitions.iter().map(Vec::len).sum();
            assert_eq!(covered + 14, extraction.diagram.node_count());
            assert!(!extraction.diagram.has_parallel_edges());
        }
    }

    #[test]
    fn y_factors_use_quarter_turns() {
        let stabiliser: PauliString = "Y".parse().unwrap();
        let extraction = shor_extraction(&[stabiliser], 1, 1, false).unwrap();
        let phases: Vec<Phase> = extraction
            .diagram
            .node_indices()
            .filter(|node| *extraction.diagram.phase(*node).denom() == 2)
            .map(|node| extraction.diagram.phase(node))
            .collect();
        assert_eq!(phases, vec![Phase::new(1, 2), Phase::new(3, 2)]);
    }
}
