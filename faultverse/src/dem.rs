//! Detector error models in the stim text format.
//!
//! Pushed-out faults flip detecting regions. Each region is labelled either as a logical
//! observable or as a detector, and every fault that flips at least one region becomes an
//! `error(p) D.. L..` line.

use crate::error::{FaultError, Result};
use crate::noise::{combine_independent_probabilities, NoiseModel};
use crate::pushout::push_out;
use crate::stim::StimImport;
use pauliweb::{FlipOperators, NodeId, PauliString};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DemTarget {
    Detector(usize),
    Logical(usize),
}

impl Display for DemTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DemTarget::Detector(index) => write!(f, "D{index}"),
            DemTarget::Logical(index) => write!(f, "L{index}"),
        }
    }
}

/// The DEM target of every detecting region, by region index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionLabels {
    labels: Vec<DemTarget>,
}

impl RegionLabels {
    /// Regions of [`FlipOperators::for_detecting_operators`] applied to logicals followed by
    /// detectors: the first `logical_ids.len()` regions are those logicals, the rest detectors
    /// `D0, D1, ..`.
    #[must_use]
    pub fn measurement_detectors(logical_ids: &[usize], detectors: usize) -> RegionLabels {
        let labels = logical_ids
            .iter()
            .map(|id| DemTarget::Logical(*id))
            .chain((0..detectors).map(DemTarget::Detector))
            .collect();
        RegionLabels { labels }
    }

    /// Regions selected by [`FlipOperators::with_logicals`] become their logicals, the remaining
    /// regions are numbered as detectors in increasing region order.
    #[must_use]
    pub fn from_logical_map(region_to_logical: &BTreeMap<usize, usize>, regions: usize) -> RegionLabels {
        let mut next_detector = 0;
        let labels = (0..regions)
            .map(|region| match region_to_logical.get(&region) {
                Some(logical) => DemTarget::Logical(*logical),
                None => {
                    next_detector += 1;
                    DemTarget::Detector(next_detector - 1)
                }
            })
            .collect();
        RegionLabels { labels }
    }

    /// # Errors
    ///
    /// Returns [`FaultError::UnlabelledRegion`] for a region without a label.
    pub fn label(&self, region: usize) -> Result<DemTarget> {
        self.labels
            .get(region)
            .copied()
            .ok_or(FaultError::UnlabelledRegion(region))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemError {
    pub probability: f64,
    pub targets: BTreeSet<DemTarget>,
}

impl Display for DemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "error({})", self.probability)?;
        for target in &self.targets {
            write!(f, " {target}")?;
        }
        Ok(())
    }
}

/// A list of independent error mechanisms and the detectors and logicals each one flips.
///
/// Displays as stim DEM text, one `error` instruction per line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorErrorModel {
    pub errors: Vec<DemError>,
}

impl DetectorErrorModel {
    /// One error per value of every pushed-out fault flipping at least one region, in fault order.
    ///
    /// # Errors
    ///
    /// Returns [`FaultError::UnlabelledRegion`] if a fault flips a region `labels` does not know.
    pub fn from_noise(noise: &NoiseModel<f64>, labels: &RegionLabels) -> Result<DetectorErrorModel> {
        let mut errors = Vec::new();
        for (fault, probability) in noise.atomic_weights() {
            if fault.detector_flips.is_empty() {
                continue;
            }
            let targets = fault
                .detector_flips
                .iter()
                .map(|region| labels.label(*region))
                .collect::<Result<BTreeSet<_>>>()?;
            errors.push(DemError {
                probability: *probability,
                targets,
            });
        }
        Ok(DetectorErrorModel { errors })
    }
}

impl Display for DetectorErrorModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for error in &self.errors {
            writeln!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Pushes out `noise` with regions rebased so that each logical anticommutes with exactly one
/// region, and labels the remaining regions as detectors.
///
/// # Errors
///
/// Fails if the flip operators cannot be built or rebased onto `logicals`.
#[tracing::instrument(level = "debug", skip_all, fields(logicals = logicals.len()))]
pub fn export_with_logicals(noise: &NoiseModel<f64>, logicals: &[PauliString]) -> Result<DetectorErrorModel> {
    let flip_ops = FlipOperators::build(Arc::clone(noise.diagram()))?;
    let (rebased, region_to_logical) = flip_ops.with_logicals(logicals)?;
    let pushed_out = push_out(noise, &rebased)?;
    let labels = RegionLabels::from_logical_map(&region_to_logical, rebased.region_gen_set().len());
    DetectorErrorModel::from_noise(&pushed_out, &labels)
}

/// Pushes out `noise` onto one region per observable and per detector, each given as the labels
/// its detecting region carries on the edges of `measurement_nodes`.
///
/// # Errors
///
/// Fails if the flip operators cannot be built or a detecting operator is not the restriction of
/// a product of detecting regions.
pub fn push_out_for_measurement_detectors<W: Clone>(
    noise: &NoiseModel<W>,
    measurement_nodes: &[NodeId],
    observables: &BTreeMap<usize, PauliString>,
    detectors: &[PauliString],
) -> Result<(NoiseModel<W>, RegionLabels)> {
    let operators: Vec<PauliString> = observables.values().chain(detectors).cloned().collect();
    let flip_ops =
        FlipOperators::build(Arc::clone(noise.diagram()))?.for_detecting_operators(measurement_nodes, &operators)?;
    let pushed_out = push_out(noise, &flip_ops)?;
    let logical_ids: Vec<usize> = observables.keys().copied().collect();
    Ok((pushed_out, RegionLabels::measurement_detectors(&logical_ids, detectors.len())))
}

impl StimImport {
    /// The detector error model of the imported circuit, merging mechanisms with the same effect.
    ///
    /// # Errors
    ///
    /// See [`push_out_for_measurement_detectors`].
    pub fn detector_error_model(&self) -> Result<DetectorErrorModel> {
        let (mut pushed_out, labels) = push_out_for_measurement_detectors(
            &self.noise,
            &self.measurement_nodes,
            &self.observables,
            &self.detectors,
        )?;
        pushed_out.compress(combine_independent_probabilities);
        DetectorErrorModel::from_noise(&pushed_out, &labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_regions_keep_their_index() {
        let region_to_logical = BTreeMap::from([(1, 0), (3, 1)]);
        let labels = RegionLabels::from_logical_map(&region_to_logical, 4);
        let expected = [
            DemTarget::Detector(0),
            DemTarget::Logical(0),
            DemTarget::Detector(1),
            DemTarget::Logical(1),
        ];
        for (region, target) in expected.into_iter().enumerate() {
            assert_eq!(labels.label(region), Ok(target));
        }
        assert_eq!(labels.label(4), Err(FaultError::UnlabelledRegion(4)));
    }

    #[test]
    fn errors_list_detectors_before_logicals() {
        let error = DemError {
            probability: 0.125,
            targets: BTreeSet::from([DemTarget::Logical(0), DemTarget::Detector(3), DemTarget::Detector(1)]),
        };
        let model = DetectorErrorModel {
            errors: vec![error.clone(), error],
        };
        assert_eq!(model.to_string(), "error(0.125) D1 D3 L0\nerror(0.125) D1 D3 L0\n");
    }
}
