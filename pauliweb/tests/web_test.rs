use binar::BitMatrix;
use pauliweb::generate::{random_clifford, zweb};
use pauliweb::{compute_detecting_regions, compute_pauli_webs, compute_stabilizers, Diagram, EdgeId, NodeType, Pauli, PauliString};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet};

fn rank_on(webs: &[PauliString], edges: impl IntoIterator<Item = EdgeId>) -> usize {
    let index_map: BTreeMap<EdgeId, usize> = edges.into_iter().enumerate().map(|(index, edge)| (edge, index)).collect();
    BitMatrix::from_row_iter(webs.iter().map(|web| web.compile(&index_map)), 2 * index_map.len()).rank()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn random_clifford_webs_are_independent(seed in any::<u64>(), qubits in 1..4usize, spiders in 0..8usize) {
        let diagram = random_clifford(&mut StdRng::seed_from_u64(seed), qubits, spiders);
        let webs = compute_pauli_webs(&diagram).unwrap();
        let boundary = diagram.boundary_edges();

        prop_assert_eq!(rank_on(&webs.stabilizers, boundary.iter().copied()), webs.stabilizers.len());
        prop_assert!(webs.stabilizers.len() <= 2 * boundary.len());
        for region in &webs.regions {
            prop_assert!(region.restrict(&boundary).is_trivial());
        }
        prop_assert_eq!(rank_on(&webs.regions, diagram.edge_indices()), webs.regions.len());
        for web in webs.stabilizers.iter().chain(&webs.regions) {
            prop_assert!(web.support().all(|edge| diagram.edge_endpoints(edge).is_some()));
        }
    }

    #[test]
    fn separate_entry_points_agree(seed in any::<u64>()) {
        let diagram = random_clifford(&mut StdRng::seed_from_u64(seed), 2, 5);
        let webs = compute_pauli_webs(&diagram).unwrap();
        prop_assert_eq!(compute_stabilizers(&diagram).unwrap(), webs.stabilizers);
        prop_assert_eq!(compute_detecting_regions(&diagram).unwrap(), webs.regions);
    }
}

#[test]
fn identity_wire_has_two_stabilizers() {
    let mut diagram = Diagram::new();
    let input = diagram.add_node(NodeType::Boundary);
    let spider = diagram.add_node(NodeType::Z);
    let output = diagram.add_node(NodeType::Boundary);
    let first = diagram.add_edge(input, spider);
    let second = diagram.add_edge(spider, output);
    diagram.set_io(vec![input], vec![output], false).unwrap();

    let webs = compute_pauli_webs(&diagram).unwrap();
    assert!(webs.regions.is_empty());
    assert_eq!(webs.stabilizers.len(), 2);
    let xx: PauliString = [(first, Pauli::X), (second, Pauli::X)].into_iter().collect();
    let zz: PauliString = [(first, Pauli::Z), (second, Pauli::Z)].into_iter().collect();
    assert_eq!(webs.stabilizers.iter().cloned().collect::<BTreeSet<_>>(), BTreeSet::from([xx, zz]));
}

#[test]
fn zweb_square_is_a_detecting_region() {
    let diagram = zweb(2, 2);
    let webs = compute_pauli_webs(&diagram).unwrap();
    assert_eq!(webs.stabilizers.len(), 4);
    assert_eq!(webs.regions.len(), 1);
    let region = &webs.regions[0];
    assert_eq!(region.weight(), 4);
    assert!(region.iter().all(|(_, pauli)| pauli == Pauli::Z));
    assert!(region.restrict(&diagram.boundary_edges()).is_trivial());
}

#[test]
fn hadamard_wire_swaps_x_and_z() {
    let mut diagram = Diagram::new();
    let input = diagram.add_node(NodeType::Boundary);
    let before = diagram.add_node(NodeType::Z);
    let hadamard = diagram.add_node(NodeType::H);
    let after = diagram.add_node(NodeType::Z);
    let output = diagram.add_node(NodeType::Boundary);
    let first = diagram.add_edge(input, before);
    diagram.add_edge(before, hadamard);
    diagram.add_edge(hadamard, after);
    let last = diagram.add_edge(after, output);
    diagram.set_io(vec![input], vec![output], false).unwrap();

    let webs = compute_pauli_webs(&diagram).unwrap();
    assert_eq!(webs.stabilizers.len(), 2);
    assert!(webs.regions.is_empty());
    let xz: PauliString = [(first, Pauli::X), (last, Pauli::Z)].into_iter().collect();
    let zx: PauliString = [(first, Pauli::Z), (last, Pauli::X)].into_iter().collect();
    let boundary = diagram.boundary_edges();
    let restricted: Vec<PauliString> = webs.stabilizers.iter().map(|web| web.restrict(&boundary)).collect();
    let combined: Vec<PauliString> = restricted.iter().chain([&xz, &zx]).cloned().collect();
    assert_eq!(rank_on(&combined, [first, last]), 2);
}

#[test]
fn non_clifford_phase_is_rejected() {
    let mut diagram = Diagram::new();
    let boundary = diagram.add_node(NodeType::Boundary);
    let spider = diagram.add_node_with_phase(NodeType::Z, pauliweb::Phase::new(1, 4));
    diagram.add_edge(boundary, spider);
    assert!(matches!(
        compute_pauli_webs(&diagram),
        Err(pauliweb::WebError::NonClifford { node, .. }) if node == spider
    ));
}
