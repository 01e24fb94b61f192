//! Faults on ZX diagrams.
//!
//! A [`NoiseModel`] lists atomic [`Fault`]s on the edges of a diagram. [`push_out`] rewrites every
//! fault into flips of boundary edges plus flips of detecting regions, using the
//! [`FlipOperators`](pauliweb::FlipOperators) of the diagram. Pushed-out models can be compared
//! for fault equivalence with [`is_fault_equivalence`], post-selected with [`post_select`] or
//! exported as a [`DetectorErrorModel`].

pub mod dem;
pub mod equivalence;
pub mod error;
pub mod fault;
pub mod noise;
pub mod pushout;
pub mod stim;

pub use dem::{export_with_logicals, push_out_for_measurement_detectors, DemTarget, DetectorErrorModel, RegionLabels};
pub use equivalence::{
    distinguishing_weight, is_fault_equivalence, post_select, search_distinguishing_weight, EmptySidePolicy,
    EquivalenceOptions, UndetectableFaults,
};
pub use error::{FaultError, Result};
pub use fault::Fault;
pub use noise::{combine_independent_probabilities, EdgeFlipWeights, NoiseModel};
pub use pushout::{push_out, push_out_fault};
pub use stim::{import_stim, StimImport};
