use super::signature::{AtomicSignatures, Signature, SignatureLayout};
use super::{EmptySidePolicy, EquivalenceOptions};
use std::collections::{BTreeMap, HashMap};

/// Least-weight combinations of the atomic signatures of one noise model, discovered one weight
/// level at a time.
struct Frontier<'a> {
    atoms: Vec<(&'a Signature, u64)>,
    layout: SignatureLayout,
    queue: BTreeMap<u64, Vec<Signature>>,
    queued: HashMap<Signature, u64>,
    recorded: HashMap<Signature, u64>,
    undetectable: HashMap<Signature, u64>,
}

impl<'a> Frontier<'a> {
    fn new(signatures: &'a AtomicSignatures) -> Frontier<'a> {
        let layout = *signatures.layout();
        let mut frontier = Frontier {
            atoms: signatures.iter().collect(),
            layout,
            queue: BTreeMap::new(),
            queued: HashMap::new(),
            recorded: HashMap::new(),
            undetectable: HashMap::new(),
        };
        frontier.queue.insert(0, vec![Signature::zeros(&layout)]);
        frontier
    }

    fn next_level(&self) -> Option<u64> {
        self.queue.keys().next().copied()
    }

    fn queue_len(&self) -> usize {
        self.queue.values().map(Vec::len).sum()
    }

    /// Records every signature first reached at weight `level` and queues its extensions.
    ///
    /// Combinations reached through weight zero atoms are drained within the level. Returns the
    /// boundary parts of the undetectable signatures recorded.
    fn process_level(&mut self, level: u64) -> Vec<Signature> {
        let mut pending = self.queue.remove(&level).unwrap_or_default();
        let mut found = Vec::new();
        while let Some(signature) = pending.pop() {
            if self.recorded.contains_key(&signature) {
                continue;
            }
            self.queued.remove(&signature);
            for (atom, weight) in &self.atoms {
                let combined = &signature ^ *atom;
                let total = level.saturating_add(*weight);
                if self.recorded.contains_key(&combined) || self.queued.get(&combined).is_some_and(|best| *best <= total) {
                    continue;
                }
                self.queued.insert(combined.clone(), total);
                if total == level {
                    pending.push(combined);
                } else {
                    self.queue.entry(total).or_default().push(combined);
                }
            }
            if !signature.is_detectable(&self.layout) {
                let boundary = signature.boundary_part(&self.layout);
                self.undetectable.insert(boundary.clone(), level);
                found.push(boundary);
            }
            self.recorded.insert(signature, level);
        }
        found
    }
}

/// The least weight at which one side has an undetectable combined fault that the other side
/// cannot produce with the same or lower weight.
///
/// Signatures of both sides are compared on their boundary bits only, so the detector counts
/// may differ. Returns `None` if no such weight exists below `options.until`.
///
/// # Panics
///
/// Panics if the two sides have different boundary counts.
#[must_use]
pub fn search_distinguishing_weight(
    first: &AtomicSignatures,
    second: &AtomicSignatures,
    options: &EquivalenceOptions,
) -> Option<u64> {
    assert_eq!(
        first.layout().boundaries,
        second.layout().boundaries,
        "signatures over different boundaries"
    );
    if options.empty_side == EmptySidePolicy::Vacuous && (first.is_empty() || second.is_empty()) {
        tracing::debug!(first = first.len(), second = second.len(), "vacuous equivalence");
        return None;
    }

    let mut left = Frontier::new(first);
    let mut right = Frontier::new(second);
    loop {
        let level = left.next_level().into_iter().chain(right.next_level()).min()?;
        if level > 0 && options.until.is_some_and(|until| level >= until) {
            return None;
        }
        let found_left = left.process_level(level);
        let found_right = right.process_level(level);
        tracing::info!(
            level,
            queued_left = left.queue_len(),
            queued_right = right.queue_len(),
            recorded_left = left.recorded.len(),
            recorded_right = right.recorded.len(),
            "explored weight level"
        );
        let unmatched_left = found_left.iter().any(|boundary| !right.undetectable.contains_key(boundary));
        let unmatched_right = found_right.iter().any(|boundary| !left.undetectable.contains_key(boundary));
        if unmatched_left || unmatched_right {
            return Some(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signatures(layout: SignatureLayout, atoms: &[(&[usize], u64)]) -> AtomicSignatures {
        let mut signatures = AtomicSignatures::new(layout);
        for (bits, weight) in atoms {
            let mut signature = Signature::zeros(&layout);
            for bit in *bits {
                signature.flip_bit(*bit);
            }
            signatures.insert(signature, *weight);
        }
        signatures
    }

    const LAYOUT: SignatureLayout = SignatureLayout {
        boundaries: 1,
        detectors: 2,
    };

    #[test]
    fn pairs_of_detected_faults_are_found() {
        // Two faults each tripping detector 0 combine into an undetectable X flip at weight 2.
        let first = signatures(LAYOUT, &[(&[0, 2], 1), (&[0], 1)]);
        let second = signatures(LAYOUT, &[(&[1], 1)]);
        let options = EquivalenceOptions::default();
        assert_eq!(search_distinguishing_weight(&first, &second, &options), Some(2));
        assert_eq!(search_distinguishing_weight(&first, &second, &options.with_until(2)), None);
        assert_eq!(search_distinguishing_weight(&first, &first, &options), None);
    }

    #[test]
    fn zero_weight_atoms_are_combined_within_a_level() {
        let first = signatures(LAYOUT, &[(&[0], 0), (&[0, 3], 0)]);
        let second = signatures(LAYOUT, &[(&[3], 4)]);
        let options = EquivalenceOptions::default();
        assert_eq!(search_distinguishing_weight(&first, &second, &options), Some(0));
    }

    #[test]
    fn empty_side_policy_decides_one_sided_searches() {
        let first = signatures(LAYOUT, &[(&[2], 3)]);
        let second = AtomicSignatures::new(SignatureLayout {
            boundaries: 1,
            detectors: 0,
        });
        let strict = EquivalenceOptions::default();
        assert_eq!(search_distinguishing_weight(&first, &second, &strict), Some(3));
        let vacuous = strict.with_empty_side(EmptySidePolicy::Vacuous);
        assert_eq!(search_distinguishing_weight(&first, &second, &vacuous), None);
    }
}
