//! Push-out: rewriting faults into boundary flips plus detector flips.
//!
//! A fault is characterised by the detecting regions and stabilizing webs it anticommutes with.
//! Pushing it out replaces its edge flips by the product of stabilizer flip operators on the
//! boundary that reproduces the same stabilizer pattern, once the canonical product of region flip
//! operators for the regions it triggers is accounted for.

use crate::error::{FaultError, Result};
use crate::fault::Fault;
use crate::noise::NoiseModel;
use pauliweb::{FlipOperators, PauliString};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Indices of the generators in `generators` that anticommute with `flips`.
fn anticommuting(flips: &PauliString, generators: &[PauliString]) -> BTreeSet<usize> {
    generators
        .iter()
        .enumerate()
        .filter(|(_, generator)| !flips.commutes(generator))
        .map(|(index, _)| index)
        .collect()
}

/// Pushes a single fault out to the boundary of the diagram of `flip_ops`.
///
/// The result flips the detectors of `fault` together with every region its edge flips
/// anticommute with, and only acts on boundary edges. Pushing out a pushed-out fault returns it
/// unchanged.
#[must_use]
pub fn push_out_fault(fault: &Fault, flip_ops: &FlipOperators) -> Fault {
    let flipped_regions = anticommuting(&fault.edge_flips, flip_ops.region_gen_set());
    let mut flipped_stabilizers = anticommuting(&fault.edge_flips, flip_ops.stab_gen_set());
    if let Some(region_flips) = flip_ops.region_flips() {
        for region in &flipped_regions {
            for stabilizer in &region_flips.stab_flip_map[*region] {
                if !flipped_stabilizers.remove(stabilizer) {
                    flipped_stabilizers.insert(*stabilizer);
                }
            }
        }
    }

    let mut edge_flips = PauliString::new();
    for stabilizer in flipped_stabilizers {
        edge_flips *= &flip_ops.stab_flip_ops()[stabilizer];
    }
    let detector_flips = fault.detector_flips.union(&flipped_regions).copied().collect();
    Fault::new(edge_flips, detector_flips)
}

/// Pushes out every fault of `model`, merging the values of faults that coincide afterwards.
///
/// # Errors
///
/// Returns [`FaultError::DiagramMismatch`] unless `model` and `flip_ops` share the same diagram
/// instance.
#[tracing::instrument(level = "debug", skip_all, fields(faults = model.num_faults()))]
pub fn push_out<W: Clone>(model: &NoiseModel<W>, flip_ops: &FlipOperators) -> Result<NoiseModel<W>> {
    if !Arc::ptr_eq(model.diagram(), flip_ops.diagram()) {
        return Err(FaultError::DiagramMismatch);
    }
    let pushed_out = model.transform_faults(|fault| push_out_fault(fault, flip_ops));
    tracing::debug!(
        before = model.atomic_faults().count(),
        after = pushed_out.atomic_faults().count(),
        "pushed out atomic faults"
    );
    Ok(pushed_out)
}
