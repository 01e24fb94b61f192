//! Fault signatures: bit packed images of pushed-out faults.
//!
//! Bit `j` is detector `j`, bit `D + i` the X component on boundary `i`, and bit `D + B + i` the Z
//! component on boundary `i`. Read as a number, this is `[Z-boundary | X-boundary | detectors]`
//! with the detectors least significant.

use crate::error::Result;
use crate::fault::Fault;
use crate::noise::NoiseModel;
use binar::{BitMatrix, BitVec, Bitwise, EchelonForm};
use derive_more::{Deref, From};
use pauliweb::{Diagram, EdgeId, PauliString, WebError};
use smallvec::{smallvec, SmallVec};
use std::collections::BTreeMap;
use std::ops::{BitXor, BitXorAssign};

const WORD_BITS: usize = u64::BITS as usize;

/// Sizes of the two parts of a signature.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SignatureLayout {
    pub boundaries: usize,
    pub detectors: usize,
}

impl SignatureLayout {
    #[must_use]
    pub fn bit_count(&self) -> usize {
        2 * self.boundaries + self.detectors
    }

    #[must_use]
    pub fn detector_bit(&self, detector: usize) -> usize {
        detector
    }

    #[must_use]
    pub fn x_bit(&self, boundary: usize) -> usize {
        self.detectors + boundary
    }

    #[must_use]
    pub fn z_bit(&self, boundary: usize) -> usize {
        self.detectors + self.boundaries + boundary
    }
}

/// A packed bit vector, least significant bit first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, From)]
pub struct Signature(SmallVec<[u64; 2]>);

impl Signature {
    #[must_use]
    pub fn zeros(layout: &SignatureLayout) -> Signature {
        Signature(smallvec![0; layout.bit_count().div_ceil(WORD_BITS)])
    }

    /// # Panics
    ///
    /// Panics if `bit` lies outside the signature.
    pub fn flip_bit(&mut self, bit: usize) {
        self.0[bit / WORD_BITS] ^= 1 << (bit % WORD_BITS);
    }

    #[must_use]
    pub fn bit(&self, bit: usize) -> bool {
        self.0
            .get(bit / WORD_BITS)
            .is_some_and(|word| (word >> (bit % WORD_BITS)) & 1 == 1)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|word| *word == 0)
    }

    /// Whether any detector bit is set.
    #[must_use]
    pub fn is_detectable(&self, layout: &SignatureLayout) -> bool {
        let full_words = layout.detectors / WORD_BITS;
        if self.0[..full_words].iter().any(|word| *word != 0) {
            return true;
        }
        let remaining = layout.detectors % WORD_BITS;
        remaining > 0 && self.0[full_words] & ((1 << remaining) - 1) != 0
    }

    /// The boundary bits alone, shifted down past the detectors.
    ///
    /// Boundary parts of signatures with different detector counts are comparable.
    #[must_use]
    pub fn boundary_part(&self, layout: &SignatureLayout) -> Signature {
        let boundary_bits = 2 * layout.boundaries;
        let mut boundary = Signature(smallvec![0; boundary_bits.div_ceil(WORD_BITS)]);
        for bit in (0..boundary_bits).filter(|bit| self.bit(layout.detectors + bit)) {
            boundary.flip_bit(bit);
        }
        boundary
    }
}

impl BitXorAssign<&Signature> for Signature {
    fn bitxor_assign(&mut self, other: &Signature) {
        for (word, other_word) in self.0.iter_mut().zip(&other.0) {
            *word ^= other_word;
        }
    }
}

impl BitXor for &Signature {
    type Output = Signature;

    fn bitxor(self, other: &Signature) -> Signature {
        let mut result = self.clone();
        result ^= other;
        result
    }
}

/// Boundary edges of `diagram` indexed by the position of their boundary node in the IO order.
///
/// # Errors
///
/// Returns [`WebError::BoundaryAllocation`] if a boundary node has no edge.
pub fn boundary_index_map(diagram: &Diagram) -> Result<BTreeMap<EdgeId, usize>> {
    diagram
        .io_order()
        .into_iter()
        .enumerate()
        .map(|(index, boundary)| -> Result<(EdgeId, usize)> {
            let edge = diagram
                .incident_edges(boundary)
                .first()
                .copied()
                .ok_or(WebError::BoundaryAllocation)?;
            Ok((edge, index))
        })
        .collect()
}

/// Boundary restrictions of a stabilizer basis in reduced echelon form.
///
/// Reducing a boundary image against it picks one representative per stabilizer coset.
#[derive(Debug, Clone)]
pub struct StabilizerBasis {
    echelon: EchelonForm,
}

impl StabilizerBasis {
    /// Compiles `stabilizers` on the boundary edges of `boundary_edges`, in `[Z | X]` layout.
    #[must_use]
    pub fn new(stabilizers: &[PauliString], boundary_edges: &BTreeMap<EdgeId, usize>) -> StabilizerBasis {
        let compiled = BitMatrix::from_row_iter(
            stabilizers.iter().map(|stabilizer| stabilizer.compile(boundary_edges)),
            2 * boundary_edges.len(),
        );
        StabilizerBasis {
            echelon: EchelonForm::new(compiled),
        }
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.echelon.rank()
    }

    fn normalize(&self, boundary_image: &BitVec) -> BitVec {
        self.echelon.reduce(boundary_image)
    }
}

/// Compiles a pushed-out fault into its normalized signature.
///
/// Edge flips off the boundary are ignored.
///
/// # Panics
///
/// Panics if the fault flips a detector `>= layout.detectors` or if `boundary_edges` does not
/// have `layout.boundaries` entries.
#[must_use]
pub fn compile_fault(
    fault: &Fault,
    boundary_edges: &BTreeMap<EdgeId, usize>,
    stabilizers: &StabilizerBasis,
    layout: &SignatureLayout,
) -> Signature {
    assert_eq!(boundary_edges.len(), layout.boundaries);
    let boundary_image = stabilizers.normalize(&fault.edge_flips.compile(boundary_edges));
    let mut signature = Signature::zeros(layout);
    for position in boundary_image.support() {
        if position < layout.boundaries {
            signature.flip_bit(layout.z_bit(position));
        } else {
            signature.flip_bit(layout.x_bit(position - layout.boundaries));
        }
    }
    for detector in &fault.detector_flips {
        assert!(*detector < layout.detectors, "detector {detector} outside the layout");
        signature.flip_bit(layout.detector_bit(*detector));
    }
    signature
}

/// The distinct non-zero signatures of a pushed-out noise model with their least weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicSignatures {
    layout: SignatureLayout,
    weights: BTreeMap<Signature, u64>,
}

impl AtomicSignatures {
    #[must_use]
    pub fn new(layout: SignatureLayout) -> AtomicSignatures {
        AtomicSignatures {
            layout,
            weights: BTreeMap::new(),
        }
    }

    /// Records `signature` at `weight` unless it is zero or already known at a weight no larger.
    pub fn insert(&mut self, signature: Signature, weight: u64) {
        if signature.is_zero() {
            return;
        }
        self.weights
            .entry(signature)
            .and_modify(|best| *best = (*best).min(weight))
            .or_insert(weight);
    }

    /// Compiles every non-trivial fault of `noise`, each at the least of its weights.
    #[must_use]
    pub fn compile(
        noise: &NoiseModel<u64>,
        boundary_edges: &BTreeMap<EdgeId, usize>,
        stabilizers: &StabilizerBasis,
        layout: SignatureLayout,
    ) -> AtomicSignatures {
        let mut signatures = AtomicSignatures::new(layout);
        for (fault, weights) in noise.atomic_faults_with_values() {
            let Some(weight) = weights.iter().min() else {
                continue;
            };
            if fault.is_trivial() {
                continue;
            }
            signatures.insert(compile_fault(fault, boundary_edges, stabilizers, &layout), *weight);
        }
        signatures
    }

    #[must_use]
    pub fn layout(&self) -> &SignatureLayout {
        &self.layout
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Signature, u64)> {
        self.weights.iter().map(|(signature, weight)| (signature, *weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pauliweb::Pauli;
    use std::collections::BTreeSet;

    #[test]
    fn bits_follow_the_layout() {
        let layout = SignatureLayout {
            boundaries: 40,
            detectors: 30,
        };
        let mut signature = Signature::zeros(&layout);
        assert_eq!(signature.len(), 2);
        signature.flip_bit(layout.z_bit(39));
        assert!(signature.bit(109));
        assert!(!signature.is_detectable(&layout));
        signature.flip_bit(layout.detector_bit(29));
        assert!(signature.is_detectable(&layout));
        let boundary = signature.boundary_part(&layout);
        assert_eq!(boundary.len(), 2);
        assert!(boundary.bit(79));
        assert_eq!(boundary.iter().map(|word| word.count_ones()).sum::<u32>(), 1);
        let cleared = &signature ^ &signature;
        assert!(cleared.is_zero());
    }

    #[test]
    fn stabilizer_equivalent_faults_share_a_signature() {
        let boundary_edges: BTreeMap<EdgeId, usize> = [(4, 0), (7, 1)].into_iter().collect();
        let stabilizers: Vec<PauliString> = vec![
            [(4, Pauli::X), (7, Pauli::X)].into_iter().collect(),
            [(4, Pauli::Z), (7, Pauli::Z)].into_iter().collect(),
        ];
        let basis = StabilizerBasis::new(&stabilizers, &boundary_edges);
        assert_eq!(basis.rank(), 2);
        let layout = SignatureLayout {
            boundaries: 2,
            detectors: 1,
        };
        let left = Fault::edge_flip(4, Pauli::Y);
        let right = Fault::edge_flip(7, Pauli::Y);
        let compile = |fault: &Fault| compile_fault(fault, &boundary_edges, &basis, &layout);
        assert_eq!(compile(&left), compile(&right));
        assert!(!compile(&left).is_zero());

        let detected = Fault::new(PauliString::new(), BTreeSet::from([0]));
        assert!(compile(&detected).is_detectable(&layout));
        assert!(compile(&Fault::from(stabilizers[0].clone())).is_zero());
    }
}
