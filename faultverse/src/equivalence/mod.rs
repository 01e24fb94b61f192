//! Fault equivalence of two noise models.
//!
//! Both models are pushed out and every atomic fault is compiled into a [`Signature`]. Combined
//! faults are explored in order of increasing weight on each side, and the models are
//! distinguished at the first weight where one side reaches an undetectable boundary effect the
//! other side cannot reach as cheaply.
//!
//! [`post_select`] lists the undetectable combined faults of a single model instead.

mod post_selection;
mod search;
mod signature;

pub use post_selection::{post_select, UndetectableFaults};
pub use search::search_distinguishing_weight;
pub use signature::{
    boundary_index_map, compile_fault, AtomicSignatures, Signature, SignatureLayout, StabilizerBasis,
};

use crate::error::{FaultError, Result};
use crate::noise::NoiseModel;
use crate::pushout::push_out;
use pauliweb::FlipOperators;
use std::sync::Arc;

/// What the search concludes when one side has no non-trivial atomic signature.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum EmptySidePolicy {
    /// Search as usual, so undetectable faults of the other side are mismatches.
    #[default]
    Strict,
    /// Report equivalence without searching.
    Vacuous,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EquivalenceOptions {
    /// Weight ceiling: only levels below it are explored, level 0 always is.
    pub until: Option<u64>,
    pub empty_side: EmptySidePolicy,
}

impl EquivalenceOptions {
    #[must_use]
    pub fn with_until(mut self, until: u64) -> Self {
        self.until = Some(until);
        self
    }

    #[must_use]
    pub fn with_empty_side(mut self, empty_side: EmptySidePolicy) -> Self {
        self.empty_side = empty_side;
        self
    }
}

fn detector_count<W>(noise: &NoiseModel<W>, flip_ops: &FlipOperators) -> usize {
    noise
        .atomic_faults()
        .filter_map(|fault| fault.detector_flips.last())
        .map(|detector| detector + 1)
        .fold(flip_ops.region_gen_set().len(), usize::max)
}

/// The least weight of a fault distinguishing the two models, if any.
///
/// The stabilizers of the first diagram normalize the boundary effects of both sides, and
/// boundary edges of the two diagrams are matched by their position in the IO order.
///
/// # Errors
///
/// Fails if the flip operators of either diagram cannot be built, and with
/// [`FaultError::BoundaryMismatch`] if the diagrams have different numbers of boundaries.
#[tracing::instrument(level = "debug", skip_all, fields(left = first.num_faults(), right = second.num_faults()))]
pub fn distinguishing_weight(
    first: &NoiseModel<u64>,
    second: &NoiseModel<u64>,
    options: &EquivalenceOptions,
) -> Result<Option<u64>> {
    let first_boundaries = boundary_index_map(first.diagram())?;
    let second_boundaries = boundary_index_map(second.diagram())?;
    if first_boundaries.len() != second_boundaries.len() {
        return Err(FaultError::BoundaryMismatch {
            left: first_boundaries.len(),
            right: second_boundaries.len(),
        });
    }

    let first_flip_ops = FlipOperators::build(Arc::clone(first.diagram()))?;
    let second_flip_ops = FlipOperators::build(Arc::clone(second.diagram()))?;
    let first_pushed = push_out(first, &first_flip_ops)?;
    let second_pushed = push_out(second, &second_flip_ops)?;

    let stabilizers = StabilizerBasis::new(first_flip_ops.stab_gen_set(), &first_boundaries);
    let first_layout = SignatureLayout {
        boundaries: first_boundaries.len(),
        detectors: detector_count(&first_pushed, &first_flip_ops),
    };
    let second_layout = SignatureLayout {
        boundaries: second_boundaries.len(),
        detectors: detector_count(&second_pushed, &second_flip_ops),
    };
    let first_signatures = AtomicSignatures::compile(&first_pushed, &first_boundaries, &stabilizers, first_layout);
    let second_signatures =
        AtomicSignatures::compile(&second_pushed, &second_boundaries, &stabilizers, second_layout);
    tracing::debug!(
        left = first_signatures.len(),
        right = second_signatures.len(),
        stabilizer_rank = stabilizers.rank(),
        "compiled atomic signatures"
    );
    Ok(search_distinguishing_weight(&first_signatures, &second_signatures, options))
}

/// Whether no fault below `options.until` distinguishes the two models.
///
/// # Errors
///
/// See [`distinguishing_weight`].
pub fn is_fault_equivalence(
    first: &NoiseModel<u64>,
    second: &NoiseModel<u64>,
    options: &EquivalenceOptions,
) -> Result<bool> {
    Ok(distinguishing_weight(first, second, options)?.is_none())
}
