//! Per-subject big segment membership.
//!
//! A [`Membership`] records which big segments a subject has been explicitly
//! included in or excluded from. Segments with no explicit status for the
//! subject are simply absent; evaluation falls back to whatever default the
//! consumer applies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Explicit segment statuses for one subject.
///
/// Built from the backing store's include/exclude lists. An explicit
/// inclusion always wins over an explicit exclusion for the same segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    segments: HashMap<String, bool>,
}

impl Membership {
    /// Builds a membership from include and exclude segment-ref lists.
    ///
    /// Exclusions are applied first, then inclusions, so a segment ref
    /// appearing in both lists resolves to included.
    #[must_use]
    pub fn from_segment_refs<I, E>(included: I, excluded: E) -> Self
    where
        I: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        let mut segments = HashMap::new();
        for segment_ref in excluded {
            segments.insert(segment_ref, false);
        }
        for segment_ref in included {
            segments.insert(segment_ref, true);
        }
        Self { segments }
    }

    /// Explicit status for a segment: `Some(true)` included, `Some(false)`
    /// excluded, `None` if the subject has no explicit status for it.
    #[must_use]
    pub fn check(&self, segment_ref: &str) -> Option<bool> {
        self.segments.get(segment_ref).copied()
    }

    /// Whether the subject has no explicit statuses at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments with an explicit status.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_membership_checks_none() {
        let membership = Membership::default();
        assert!(membership.is_empty());
        assert_eq!(membership.check("segment.g1"), None);
    }

    #[test]
    fn included_segment_checks_true() {
        let membership =
            Membership::from_segment_refs(vec!["segment.g1".to_string()], Vec::new());
        assert_eq!(membership.check("segment.g1"), Some(true));
        assert_eq!(membership.check("segment.g2"), None);
    }

    #[test]
    fn excluded_segment_checks_false() {
        let membership =
            Membership::from_segment_refs(Vec::new(), vec!["segment.g1".to_string()]);
        assert_eq!(membership.check("segment.g1"), Some(false));
    }

    #[test]
    fn inclusion_wins_over_exclusion() {
        let membership = Membership::from_segment_refs(
            vec!["segment.g1".to_string()],
            vec!["segment.g1".to_string()],
        );
        assert_eq!(membership.check("segment.g1"), Some(true));
    }

    #[test]
    fn serde_round_trip() {
        let membership = Membership::from_segment_refs(
            vec!["a".to_string()],
            vec!["b".to_string()],
        );
        let json = serde_json::to_string(&membership).unwrap();
        let back: Membership = serde_json::from_str(&json).unwrap();
        assert_eq!(membership, back);
    }

    proptest! {
        /// Any ref in the include list checks Some(true), even if it also
        /// appears in the exclude list.
        #[test]
        fn included_refs_always_check_true(
            included in proptest::collection::vec("[a-z]{1,8}", 0..8),
            excluded in proptest::collection::vec("[a-z]{1,8}", 0..8),
        ) {
            let membership =
                Membership::from_segment_refs(included.clone(), excluded);
            for segment_ref in &included {
                prop_assert_eq!(membership.check(segment_ref), Some(true));
            }
        }

        /// Refs in neither list have no explicit status.
        #[test]
        fn unlisted_refs_check_none(
            included in proptest::collection::vec("[a-z]{1,8}", 0..8),
            excluded in proptest::collection::vec("[a-z]{1,8}", 0..8),
            probe in "[0-9]{1,8}",
        ) {
            // Probe draws from digits, lists draw from letters, so the
            // probe can never collide with a listed ref.
            let membership = Membership::from_segment_refs(included, excluded);
            prop_assert_eq!(membership.check(&probe), None);
        }
    }
}
