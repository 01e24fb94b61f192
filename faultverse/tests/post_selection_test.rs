use faultverse::equivalence::{boundary_index_map, compile_fault, Signature, StabilizerBasis};
use faultverse::{post_select, push_out, NoiseModel};
use pauliweb::generate::{random_clifford, zweb};
use pauliweb::{Diagram, FlipOperators};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Post-selected faults of `diagram` under unit edge flip noise, checked against every XOR of a
/// subset of the compiled atomic faults that flips no detector.
fn assert_matches_subset_enumeration(diagram: Diagram) -> usize {
    let diagram = Arc::new(diagram);
    let flip_ops = FlipOperators::build(Arc::clone(&diagram)).unwrap();
    let noise = NoiseModel::<u64>::edge_flip_noise(Arc::clone(&diagram));
    let faults = post_select(&noise, &flip_ops).unwrap();
    let layout = *faults.layout();
    let found: Vec<Signature> = faults.collect();
    let distinct: BTreeSet<Signature> = found.iter().cloned().collect();
    assert_eq!(distinct.len(), found.len(), "a fault was listed twice");

    let boundaries = boundary_index_map(&diagram).unwrap();
    let stabilizers = StabilizerBasis::new(flip_ops.stab_gen_set(), &boundaries);
    let mut reachable = BTreeSet::from([Signature::zeros(&layout)]);
    for fault in push_out(&noise, &flip_ops).unwrap().atomic_faults() {
        let atom = compile_fault(fault, &boundaries, &stabilizers, &layout);
        let extended: Vec<Signature> = reachable.iter().map(|signature| signature ^ &atom).collect();
        reachable.extend(extended);
    }
    let undetectable: BTreeSet<Signature> = reachable
        .into_iter()
        .filter(|signature| !signature.is_detectable(&layout))
        .collect();
    assert_eq!(distinct, undetectable);
    found.len()
}

#[test]
fn zweb_post_selection_lists_every_undetectable_fault() {
    let count = assert_matches_subset_enumeration(zweb(2, 2));
    assert!(count > 1);
    assert!(count.is_power_of_two());
    assert_matches_subset_enumeration(zweb(2, 3));
}

#[test]
fn first_listed_fault_is_trivial() {
    let diagram = Arc::new(zweb(2, 2));
    let flip_ops = FlipOperators::build(Arc::clone(&diagram)).unwrap();
    let noise = NoiseModel::<u64>::edge_flip_noise(diagram);
    let mut faults = post_select(&noise, &flip_ops).unwrap();
    assert_eq!(faults.layout().boundaries, 4);
    assert_eq!(faults.layout().detectors, 1);
    assert!(faults.next().is_some_and(|first| first.is_zero()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn random_diagrams_match_subset_enumeration(seed in any::<u64>(), spiders in 1..5usize) {
        let diagram = random_clifford(&mut StdRng::seed_from_u64(seed), 2, spiders);
        let count = assert_matches_subset_enumeration(diagram);
        prop_assert!(count.is_power_of_two());
    }
}
