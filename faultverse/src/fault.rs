use pauliweb::{EdgeId, Pauli, PauliString};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// A fault: the Paulis it applies to diagram edges and the detecting regions it is known to flip.
///
/// Detector indices refer to the region numbering of one fixed set of flip operators; two faults
/// with equal components are the same fault.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fault {
    pub edge_flips: PauliString,
    pub detector_flips: BTreeSet<usize>,
}

impl Fault {
    #[must_use]
    pub fn new(edge_flips: PauliString, detector_flips: BTreeSet<usize>) -> Fault {
        Fault {
            edge_flips,
            detector_flips,
        }
    }

    /// A single Pauli on a single edge.
    #[must_use]
    pub fn edge_flip(edge: EdgeId, pauli: Pauli) -> Fault {
        Fault::from(PauliString::unary(edge, pauli))
    }

    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.detector_flips.is_empty() && self.edge_flips.is_trivial()
    }
}

impl From<PauliString> for Fault {
    fn from(edge_flips: PauliString) -> Fault {
        Fault::new(edge_flips, BTreeSet::new())
    }
}

impl Display for Fault {
    /// Edge flips followed by the flipped detectors, e.g. `X3 Z5 | D0 D2`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.edge_flips)?;
        if !self.detector_flips.is_empty() {
            write!(f, " |")?;
            for detector in &self.detector_flips {
                write!(f, " D{detector}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_flip_is_trivial() {
        assert!(Fault::edge_flip(3, Pauli::I).is_trivial());
        assert!(!Fault::edge_flip(3, Pauli::Y).is_trivial());
        assert!(!Fault::new(PauliString::new(), BTreeSet::from([1])).is_trivial());
    }

    #[test]
    fn display_lists_detectors() {
        let fault = Fault::new("XIZ".parse().unwrap(), BTreeSet::from([0, 2]));
        assert_eq!(fault.to_string(), "X0 Z2 | D0 D2");
        assert_eq!(Fault::default().to_string(), "I");
    }
}
