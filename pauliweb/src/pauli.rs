//! Single-edge Pauli operators and sparse Pauli strings over diagram edges.
//!
//! Phases are ignored throughout: the algebra is the Pauli group modulo its center, which is what
//! Pauli webs and faults need.

use binar::{BitVec, BitwiseMut};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::ops::{Mul, MulAssign};
use std::str::FromStr;

/// All elements of a given type. Usually used for simple enums.
pub trait All<const NUM_ELEMENTS: usize>: Sized {
    fn all() -> [Self; NUM_ELEMENTS];
}

/// One of the four Pauli matrices up to a scalar factor.
///
/// The discriminant encodes the X component in bit 0 and the Z component in bit 1, so that the
/// group product is the bitwise xor of the codes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pauli {
    #[default]
    I = 0b00,
    X = 0b01,
    Z = 0b10,
    Y = 0b11,
}

impl All<4> for Pauli {
    fn all() -> [Self; 4] {
        [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z]
    }
}

impl Pauli {
    /// The three non-identity Paulis.
    pub const NON_IDENTITY: [Pauli; 3] = [Pauli::X, Pauli::Y, Pauli::Z];

    #[must_use]
    pub fn has_x(self) -> bool {
        (self as u8) & 0b01 != 0
    }

    #[must_use]
    pub fn has_z(self) -> bool {
        (self as u8) & 0b10 != 0
    }

    #[must_use]
    pub fn from_bits(x: bool, z: bool) -> Pauli {
        // Every two-bit code is a valid discriminant.
        Pauli::from_u8(u8::from(x) | (u8::from(z) << 1)).unwrap_or_default()
    }

    #[must_use]
    pub fn commutes(self, other: Pauli) -> bool {
        self == Pauli::I || other == Pauli::I || self == other
    }

    /// A single-qubit Pauli anticommuting with `self`, X unless `self` is X.
    ///
    /// Identity has no anticommuting partner and maps to identity.
    #[must_use]
    pub fn anticommuting(self) -> Pauli {
        match self {
            Pauli::I => Pauli::I,
            Pauli::X => Pauli::Z,
            Pauli::Y | Pauli::Z => Pauli::X,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }
}

impl Mul for Pauli {
    type Output = Pauli;

    fn mul(self, other: Pauli) -> Pauli {
        Pauli::from_u8((self as u8) ^ (other as u8)).unwrap_or_default()
    }
}

impl MulAssign for Pauli {
    fn mul_assign(&mut self, other: Pauli) {
        *self = *self * other;
    }
}

impl Display for Pauli {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Pauli {
    type Error = PauliParseError;

    fn try_from(character: char) -> Result<Self, Self::Error> {
        match character.to_ascii_uppercase() {
            'I' | '_' => Ok(Pauli::I),
            'X' => Ok(Pauli::X),
            'Y' => Ok(Pauli::Y),
            'Z' => Ok(Pauli::Z),
            _ => Err(PauliParseError(character)),
        }
    }
}

/// A character that is not one of `I`, `X`, `Y`, `Z`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a Pauli character")]
pub struct PauliParseError(pub char);

/// A sparse product of single-edge Paulis, keyed by edge (or qubit) index.
///
/// Identity entries are never stored, so two strings are equal iff they act identically. Keys are
/// kept sorted, which makes iteration order, and every choice derived from it, deterministic.
///
/// ```
/// use pauliweb::{Pauli, PauliString};
///
/// let left: PauliString = "IIIIXXXXYYYYZZZZ".parse().unwrap();
/// let right: PauliString = "IXYZIXYZIXYZIXYZ".parse().unwrap();
/// assert_eq!(&left * &right, "IXYZXIZYYZIXZYXI".parse().unwrap());
/// assert_eq!(PauliString::unary(4, Pauli::I), PauliString::new());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PauliString {
    entries: BTreeMap<usize, Pauli>,
}

impl PauliString {
    #[must_use]
    pub fn new() -> PauliString {
        PauliString::default()
    }

    /// A string acting with `pauli` on `index` only; empty for identity.
    #[must_use]
    pub fn unary(index: usize, pauli: Pauli) -> PauliString {
        let mut result = PauliString::new();
        result.set(index, pauli);
        result
    }

    fn set(&mut self, index: usize, pauli: Pauli) {
        if pauli == Pauli::I {
            self.entries.remove(&index);
        } else {
            self.entries.insert(index, pauli);
        }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Pauli {
        self.entries.get(&index).copied().unwrap_or(Pauli::I)
    }

    /// Non-identity entries in increasing index order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, Pauli)> + '_ {
        self.entries.iter().map(|(index, pauli)| (*index, *pauli))
    }

    pub fn support(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    /// Number of non-identity entries.
    #[must_use]
    pub fn weight(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn restrict(&self, indices: &BTreeSet<usize>) -> PauliString {
        self.restrict_by(|index| indices.contains(&index))
    }

    #[must_use]
    pub fn restrict_by(&self, mut keep: impl FnMut(usize) -> bool) -> PauliString {
        PauliString {
            entries: self
                .entries
                .iter()
                .filter(|(index, _)| keep(**index))
                .map(|(index, pauli)| (*index, *pauli))
                .collect(),
        }
    }

    /// Whether the two strings commute, i.e. they anticommute on an even number of indices.
    #[must_use]
    pub fn commutes(&self, other: &PauliString) -> bool {
        let (smaller, larger) = if self.weight() <= other.weight() {
            (self, other)
        } else {
            (other, self)
        };
        smaller
            .iter()
            .filter(|(index, pauli)| !pauli.commutes(larger.get(*index)))
            .count()
            % 2
            == 0
    }

    /// Compiles the string into a GF(2) vector `[Z-bits | X-bits]` of length `2 * index_map.len()`.
    ///
    /// `index_map` maps string indices to bit positions; entries on unmapped indices are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `index_map` maps to a position `>= index_map.len()`.
    #[must_use]
    pub fn compile(&self, index_map: &BTreeMap<usize, usize>) -> BitVec {
        let size = index_map.len();
        let mut compiled = BitVec::zeros(2 * size);
        for (index, pauli) in self.iter() {
            if let Some(position) = index_map.get(&index) {
                if pauli.has_z() {
                    compiled.assign_index(*position, true);
                }
                if pauli.has_x() {
                    compiled.assign_index(*position + size, true);
                }
            }
        }
        compiled
    }

    /// Inverse of [`PauliString::compile`] for a list of indices, `indices[position]` being the index
    /// compiled to `position`.
    #[must_use]
    pub fn decompile(bits: &BitVec, indices: &[usize]) -> PauliString {
        use binar::Bitwise;
        let size = indices.len();
        indices
            .iter()
            .enumerate()
            .map(|(position, index)| (*index, Pauli::from_bits(bits.index(position + size), bits.index(position))))
            .collect()
    }

    /// Renames every index through `map`.
    #[must_use]
    pub fn remapped(&self, mut map: impl FnMut(usize) -> usize) -> PauliString {
        self.iter().map(|(index, pauli)| (map(index), pauli)).collect()
    }
}

impl FromIterator<(usize, Pauli)> for PauliString {
    /// Later entries for the same index multiply onto earlier ones.
    fn from_iter<T: IntoIterator<Item = (usize, Pauli)>>(iter: T) -> Self {
        let mut result = PauliString::new();
        for (index, pauli) in iter {
            let product = result.get(index) * pauli;
            result.set(index, product);
        }
        result
    }
}

impl Mul for &PauliString {
    type Output = PauliString;

    fn mul(self, other: &PauliString) -> PauliString {
        let mut product = self.clone();
        product *= other;
        product
    }
}

impl Mul for PauliString {
    type Output = PauliString;

    fn mul(mut self, other: PauliString) -> PauliString {
        self *= &other;
        self
    }
}

impl MulAssign<&PauliString> for PauliString {
    fn mul_assign(&mut self, other: &PauliString) {
        for (index, pauli) in other.iter() {
            let product = self.get(index) * pauli;
            self.set(index, product);
        }
    }
}

impl FromStr for PauliString {
    type Err = PauliParseError;

    /// Parses a dense string such as `"IXYZ"`, the character at position `i` acting on index `i`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .enumerate()
            .map(|(index, character)| Pauli::try_from(character).map(|pauli| (index, pauli)))
            .collect()
    }
}

impl Display for PauliString {
    /// Sparse notation such as `X0 Z3`, or `I` for the trivial string.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_trivial() {
            return write!(f, "I");
        }
        for (position, (index, pauli)) in self.iter().enumerate() {
            if position > 0 {
                write!(f, " ")?;
            }
            write!(f, "{pauli}{index}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(dense: &str) -> PauliString {
        dense.parse().unwrap()
    }

    #[test]
    fn pauli_group_table() {
        assert_eq!(Pauli::X * Pauli::Y, Pauli::Z);
        assert_eq!(Pauli::Y * Pauli::Z, Pauli::X);
        assert_eq!(Pauli::Z * Pauli::X, Pauli::Y);
        for pauli in Pauli::all() {
            assert_eq!(pauli * pauli, Pauli::I);
            assert_eq!(pauli * Pauli::I, pauli);
            assert!(pauli.commutes(Pauli::I));
            assert!(pauli.commutes(pauli));
            assert_eq!(Pauli::from_bits(pauli.has_x(), pauli.has_z()), pauli);
        }
        assert!(!Pauli::X.commutes(Pauli::Z));
        for pauli in Pauli::NON_IDENTITY {
            assert!(!pauli.commutes(pauli.anticommuting()));
        }
    }

    #[test]
    fn constructor() {
        assert!(PauliString::new().is_trivial());
        let parsed = string("XYZ");
        assert_eq!(parsed.iter().collect::<Vec<_>>(), vec![(0, Pauli::X), (1, Pauli::Y), (2, Pauli::Z)]);
        assert_eq!(PauliString::unary(4, Pauli::Z).iter().collect::<Vec<_>>(), vec![(4, Pauli::Z)]);
        assert!("IXQ".parse::<PauliString>().is_err());
    }

    #[test]
    fn elided_identity() {
        assert_eq!(
            string("IXIIZYIX").iter().collect::<Vec<_>>(),
            vec![(1, Pauli::X), (4, Pauli::Z), (5, Pauli::Y), (7, Pauli::X)]
        );
        assert_eq!(
            (&string("IXIIZIX") * &string("XXZIYI")).iter().collect::<Vec<_>>(),
            vec![(0, Pauli::X), (2, Pauli::Z), (4, Pauli::X), (6, Pauli::X)]
        );
    }

    #[test]
    fn commutation() {
        assert!(PauliString::new().commutes(&PauliString::new()));
        assert!(string("IIII").commutes(&string("IXZY")));
        assert!(string("IZZI").commutes(&string("XIZY")));
        assert!(!string("IZZI").commutes(&string("IXII")));
        assert!(!string("IZZI").commutes(&string("IZYI")));
        assert!(string("IZZI").commutes(&string("IYXX")));
        assert!(!string("YZZI").commutes(&string("XXXX")));
    }

    #[test]
    fn compile_layout() {
        let index_map: BTreeMap<usize, usize> = [(10, 0), (20, 1), (30, 2)].into_iter().collect();
        let pauli: PauliString = [(10, Pauli::Z), (20, Pauli::X), (30, Pauli::Y), (40, Pauli::X)]
            .into_iter()
            .collect();
        let compiled = pauli.compile(&index_map);
        assert_eq!(compiled, "101011".parse().unwrap());
        assert_eq!(PauliString::decompile(&compiled, &[10, 20, 30]), pauli.restrict_by(|index| index != 40));
    }

    #[test]
    fn display() {
        assert_eq!(string("XIZ").to_string(), "X0 Z2");
        assert_eq!(PauliString::new().to_string(), "I");
        assert_eq!(string("IY").remapped(|index| index + 5).to_string(), "Y6");
    }
}
