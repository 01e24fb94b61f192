//! Undetectable faults surviving post-selection on trivial detector outcomes.

use super::detector_count;
use super::signature::{boundary_index_map, compile_fault, Signature, SignatureLayout, StabilizerBasis};
use crate::error::Result;
use crate::noise::NoiseModel;
use crate::pushout::push_out;
use pauliweb::FlipOperators;
use std::collections::BTreeSet;

/// Combinations of `signatures` that flip no detector.
///
/// Detectors are eliminated one at a time: every pair of signatures flipping the current detector
/// is combined, and the signatures flipping it are dropped afterwards. The returned set spans
/// every undetectable combination and always contains zero.
fn eliminate_detectors(signatures: impl IntoIterator<Item = Signature>, layout: &SignatureLayout) -> BTreeSet<Signature> {
    let mut undetectable = BTreeSet::from([Signature::zeros(layout)]);
    let mut detectable = BTreeSet::new();
    for signature in signatures {
        if signature.is_detectable(layout) {
            detectable.insert(signature);
        } else {
            undetectable.insert(signature);
        }
    }

    for detector in 0..layout.detectors {
        let bit = layout.detector_bit(detector);
        let flipping: Vec<Signature> = detectable.iter().filter(|signature| signature.bit(bit)).cloned().collect();
        for (index, first) in flipping.iter().enumerate() {
            for second in &flipping[index + 1..] {
                let combined = first ^ second;
                if combined.is_detectable(layout) {
                    detectable.insert(combined);
                } else {
                    undetectable.insert(combined);
                }
            }
        }
        detectable.retain(|signature| !signature.bit(bit));
        tracing::debug!(
            detector,
            detectable = detectable.len(),
            undetectable = undetectable.len(),
            "eliminated detector"
        );
    }
    undetectable
}

fn highest_bit(signature: &Signature) -> Option<usize> {
    signature
        .iter()
        .enumerate()
        .rev()
        .find(|(_, word)| **word != 0)
        .map(|(index, word)| index * u64::BITS as usize + (u64::BITS - 1 - word.leading_zeros()) as usize)
}

/// Every undetectable combined fault of a noise model, each exactly once.
///
/// The faults form a linear space; it is walked in Gray code order over an independent basis, so
/// consecutive items differ by one basis signature. The first item is the zero signature.
#[derive(Debug, Clone)]
pub struct UndetectableFaults {
    layout: SignatureLayout,
    basis: Vec<Signature>,
    current: Signature,
    index: u128,
    count: u128,
}

impl UndetectableFaults {
    /// The space spanned by `generators`, none of which may flip a detector.
    #[must_use]
    pub fn spanned_by(generators: impl IntoIterator<Item = Signature>, layout: SignatureLayout) -> UndetectableFaults {
        // Kept sorted by decreasing pivot so each candidate is reduced in one pass.
        let mut basis: Vec<(usize, Signature)> = Vec::new();
        for mut candidate in generators {
            debug_assert!(!candidate.is_detectable(&layout));
            for (pivot, vector) in &basis {
                if candidate.bit(*pivot) {
                    candidate ^= vector;
                }
            }
            if let Some(pivot) = highest_bit(&candidate) {
                let position = basis.partition_point(|(other, _)| *other > pivot);
                basis.insert(position, (pivot, candidate));
            }
        }
        let count = u32::try_from(basis.len())
            .ok()
            .and_then(|dimension| 1u128.checked_shl(dimension))
            .unwrap_or(u128::MAX);
        UndetectableFaults {
            current: Signature::zeros(&layout),
            layout,
            basis: basis.into_iter().map(|(_, vector)| vector).collect(),
            index: 0,
            count,
        }
    }

    #[must_use]
    pub fn layout(&self) -> &SignatureLayout {
        &self.layout
    }

    /// Dimension of the space; it holds `2^dimension` faults.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.basis.len()
    }

    #[must_use]
    pub fn basis(&self) -> &[Signature] {
        &self.basis
    }
}

impl Iterator for UndetectableFaults {
    type Item = Signature;

    fn next(&mut self) -> Option<Signature> {
        if self.index >= self.count {
            return None;
        }
        if self.index > 0 {
            let flipped = self.index.trailing_zeros() as usize;
            self.current ^= &self.basis[flipped];
        }
        self.index += 1;
        Some(self.current.clone())
    }
}

/// The undetectable faults of `noise` when every detector is post-selected on its trivial outcome.
///
/// `noise` is pushed out with `flip_ops`, its faults compiled with the boundary in IO order and
/// normalized by the stabilizers of `flip_ops`. One signature is produced per distinct boundary
/// effect up to stabilizers.
///
/// # Errors
///
/// Fails if the boundary is not allocated one-to-one or if `flip_ops` belong to another diagram.
#[tracing::instrument(level = "debug", skip_all, fields(faults = noise.num_faults()))]
pub fn post_select<W: Clone>(noise: &NoiseModel<W>, flip_ops: &FlipOperators) -> Result<UndetectableFaults> {
    let boundaries = boundary_index_map(noise.diagram())?;
    let pushed_out = push_out(noise, flip_ops)?;
    let stabilizers = StabilizerBasis::new(flip_ops.stab_gen_set(), &boundaries);
    let layout = SignatureLayout {
        boundaries: boundaries.len(),
        detectors: detector_count(&pushed_out, flip_ops),
    };
    let signatures: BTreeSet<Signature> = pushed_out
        .atomic_faults()
        .filter(|fault| !fault.is_trivial())
        .map(|fault| compile_fault(fault, &boundaries, &stabilizers, &layout))
        .filter(|signature| !signature.is_zero())
        .collect();
    let generators = eliminate_detectors(signatures, &layout);
    Ok(UndetectableFaults::spanned_by(generators, layout))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: SignatureLayout = SignatureLayout {
        boundaries: 1,
        detectors: 2,
    };

    fn signature(bits: u8) -> Signature {
        let mut signature = Signature::zeros(&LAYOUT);
        for bit in (0..LAYOUT.bit_count()).filter(|bit| bits >> bit & 1 == 1) {
            signature.flip_bit(bit);
        }
        signature
    }

    #[test]
    fn pairs_sharing_a_detector_cancel() {
        // Detector bits are the two lowest, then X and Z of the boundary.
        let atoms = [0b0101, 0b0111, 0b1010].map(signature);
        let generators = eliminate_detectors(atoms, &LAYOUT);
        assert!(generators.contains(&signature(0)));
        assert!(generators.iter().all(|generator| !generator.is_detectable(&LAYOUT)));

        let faults: Vec<Signature> = UndetectableFaults::spanned_by(generators, LAYOUT).collect();
        let expected: BTreeSet<Signature> = [0b0000, 0b1000].map(signature).into();
        assert_eq!(faults.len(), expected.len());
        assert_eq!(faults.into_iter().collect::<BTreeSet<_>>(), expected);
    }

    #[test]
    fn gray_code_walk_visits_the_whole_span() {
        let generators = [0b0100, 0b1000, 0b1100].map(signature);
        let faults = UndetectableFaults::spanned_by(generators, LAYOUT);
        assert_eq!(faults.dimension(), 2);
        let visited: Vec<Signature> = faults.collect();
        assert_eq!(visited[0], signature(0));
        assert_eq!(visited.len(), 4);
        assert_eq!(visited.iter().collect::<BTreeSet<_>>().len(), 4);
    }

    #[test]
    fn highest_bit_spans_words() {
        let layout = SignatureLayout {
            boundaries: 40,
            detectors: 3,
        };
        let mut signature = Signature::zeros(&layout);
        assert_eq!(highest_bit(&signature), None);
        signature.flip_bit(2);
        assert_eq!(highest_bit(&signature), Some(2));
        signature.flip_bit(70);
        assert_eq!(highest_bit(&signature), Some(70));
    }
}
