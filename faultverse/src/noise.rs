//! Noise models: multisets of atomic faults on one diagram.
//!
//! Every atomic fault carries a list of values, one per independent mechanism producing it. The
//! values are either combinatorial weights (`u64`, for equivalence checking) or probabilities
//! (`f64`, for detector error models):
//! - [`NoiseModel::compress`] folds each list into a single value,
//! - [`NoiseModel::transform_faults`] relabels faults and merges the lists of colliding ones.

use crate::fault::Fault;
use pauliweb::{Diagram, EdgeId, Pauli};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Per-edge values of the default edge flip noise.
///
/// A `None` entry leaves that Pauli out. Idealised edges carry no noise at all.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeFlipWeights<W> {
    pub x: Option<W>,
    pub y: Option<W>,
    pub z: Option<W>,
    pub idealised_edges: BTreeSet<EdgeId>,
}

impl<W: Clone> EdgeFlipWeights<W> {
    /// The same value for X, Y and Z.
    #[must_use]
    pub fn uniform(value: W) -> Self {
        EdgeFlipWeights {
            x: Some(value.clone()),
            y: Some(value.clone()),
            z: Some(value),
            idealised_edges: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_idealised_edges(mut self, edges: impl IntoIterator<Item = EdgeId>) -> Self {
        self.idealised_edges.extend(edges);
        self
    }

    fn entries(&self) -> impl Iterator<Item = (Pauli, &W)> {
        [(Pauli::X, &self.x), (Pauli::Y, &self.y), (Pauli::Z, &self.z)]
            .into_iter()
            .filter_map(|(pauli, value)| value.as_ref().map(|value| (pauli, value)))
    }
}

impl Default for EdgeFlipWeights<u64> {
    fn default() -> Self {
        EdgeFlipWeights::uniform(1)
    }
}

/// Atomic faults on a shared diagram, each with the values of the mechanisms producing it.
#[derive(Debug, Clone)]
pub struct NoiseModel<W> {
    diagram: Arc<Diagram>,
    faults: BTreeMap<Fault, Vec<W>>,
}

impl<W> NoiseModel<W> {
    #[must_use]
    pub fn new(diagram: Arc<Diagram>) -> Self {
        NoiseModel {
            diagram,
            faults: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_faults(diagram: Arc<Diagram>, faults: impl IntoIterator<Item = (Fault, W)>) -> Self {
        let mut model = NoiseModel::new(diagram);
        for (fault, value) in faults {
            model.add_fault(fault, value);
        }
        model
    }

    pub fn add_fault(&mut self, fault: Fault, value: W) {
        self.faults.entry(fault).or_default().push(value);
    }

    #[must_use]
    pub fn diagram(&self) -> &Arc<Diagram> {
        &self.diagram
    }

    /// Number of fault mechanisms, counting every value of every fault.
    #[must_use]
    pub fn num_faults(&self) -> usize {
        self.faults.values().map(Vec::len).sum()
    }

    /// Distinct faults in increasing order.
    pub fn atomic_faults(&self) -> impl Iterator<Item = &Fault> {
        self.faults.keys()
    }

    pub fn atomic_faults_with_values(&self) -> impl Iterator<Item = (&Fault, &[W])> {
        self.faults.iter().map(|(fault, values)| (fault, values.as_slice()))
    }

    /// Every fault once per value.
    pub fn atomic_weights(&self) -> impl Iterator<Item = (&Fault, &W)> {
        self.faults
            .iter()
            .flat_map(|(fault, values)| values.iter().map(move |value| (fault, value)))
    }

    /// Folds the values of every non-trivial fault into one with `reweight`.
    pub fn compress(&mut self, mut reweight: impl FnMut(W, W) -> W) {
        for (fault, values) in &mut self.faults {
            if values.len() < 2 || fault.is_trivial() {
                continue;
            }
            let compressed = values.drain(..).reduce(&mut reweight);
            values.extend(compressed);
        }
    }
}

impl<W: Clone> NoiseModel<W> {
    /// One fault per edge and configured Pauli, skipping idealised edges.
    #[must_use]
    pub fn weighted_edge_flip_noise(diagram: Arc<Diagram>, weights: &EdgeFlipWeights<W>) -> Self {
        let faults: Vec<(Fault, W)> = diagram
            .edge_indices()
            .filter(|edge| !weights.idealised_edges.contains(edge))
            .flat_map(|edge| {
                weights
                    .entries()
                    .map(move |(pauli, value)| (Fault::edge_flip(edge, pauli), value.clone()))
            })
            .collect();
        NoiseModel::from_faults(diagram, faults)
    }

    /// Maps every fault through `transform`, concatenating the values of faults mapped together.
    #[must_use]
    pub fn transform_faults(&self, mut transform: impl FnMut(&Fault) -> Fault) -> Self {
        let mut transformed = NoiseModel::new(Arc::clone(&self.diagram));
        for (fault, values) in &self.faults {
            transformed
                .faults
                .entry(transform(fault))
                .or_default()
                .extend(values.iter().cloned());
        }
        transformed
    }
}

impl NoiseModel<u64> {
    /// Unit X, Y and Z flips on every edge.
    #[must_use]
    pub fn edge_flip_noise(diagram: Arc<Diagram>) -> Self {
        NoiseModel::weighted_edge_flip_noise(diagram, &EdgeFlipWeights::default())
    }
}

/// Probability that exactly one of two independent events happens.
#[must_use]
pub fn combine_independent_probabilities(first: f64, second: f64) -> f64 {
    first * (1.0 - second) + second * (1.0 - first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pauliweb::generate::zweb;
    use pauliweb::PauliString;

    #[test]
    fn edge_flip_noise_skips_idealised_edges() {
        let diagram = Arc::new(zweb(2, 2));
        let noise = NoiseModel::edge_flip_noise(Arc::clone(&diagram));
        assert_eq!(noise.num_faults(), 3 * diagram.edge_count());

        let weights = EdgeFlipWeights {
            y: None,
            ..EdgeFlipWeights::uniform(2)
        }
        .with_idealised_edges([0, 1]);
        let noise = NoiseModel::weighted_edge_flip_noise(diagram.clone(), &weights);
        assert_eq!(noise.num_faults(), 2 * (diagram.edge_count() - 2));
        assert!(noise.atomic_weights().all(|(_, weight)| *weight == 2));
        assert!(noise.atomic_faults().all(|fault| fault.edge_flips.support().all(|edge| edge > 1)));
    }

    #[test]
    fn compress_folds_values() {
        let diagram = Arc::new(zweb(1, 1));
        let fault = Fault::edge_flip(0, Pauli::X);
        let mut noise = NoiseModel::from_faults(
            diagram,
            [(fault.clone(), 0.1), (fault.clone(), 0.2), (Fault::default(), 0.3), (Fault::default(), 0.4)],
        );
        noise.compress(combine_independent_probabilities);
        let values: Vec<(&Fault, &[f64])> = noise.atomic_faults_with_values().collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].1.len(), 2);
        assert!((values[1].1[0] - 0.26).abs() < 1e-12);
    }

    #[test]
    fn transform_merges_collisions() {
        let diagram = Arc::new(zweb(1, 1));
        let noise = NoiseModel::edge_flip_noise(diagram);
        let count = noise.num_faults();
        let merged = noise.transform_faults(|fault| Fault::from(fault.edge_flips.restrict_by(|edge| edge == 0)));
        assert_eq!(merged.num_faults(), count);
        assert_eq!(merged.atomic_faults().count(), 4);
        assert!(merged.atomic_faults().any(|fault| fault.edge_flips == PauliString::new()));
    }
}
