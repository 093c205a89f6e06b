//! Overlap resolution for recognizer output
//!
//! Redaction is only correct over a non-overlapping span set, so every
//! recognizer result passes through [`resolve_overlaps`] before any policy
//! is consulted.
//!
//! Candidates are ranked by:
//! 1. higher confidence,
//! 2. then longer span,
//! 3. then smaller start offset,
//! 4. then entity label (lexicographic), so identical spans reported under
//!    two types still resolve the same way every time.
//!
//! Walking the ranking, a candidate is kept iff it overlaps none of the
//! spans already kept. Every dropped candidate overlaps a kept span, so the
//! result is a maximal non-overlapping set. It is returned ordered by start.

use crate::anonymization::models::PiiMatch;
use std::cmp::Ordering;

fn priority(a: &PiiMatch, b: &PiiMatch) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.entity_type.label().cmp(b.entity_type.label()))
}

/// Reduce `candidates` to a deterministic, maximal, non-overlapping set
/// ordered by ascending start offset.
pub fn resolve_overlaps(mut candidates: Vec<PiiMatch>) -> Vec<PiiMatch> {
    candidates.sort_by(priority);

    let mut kept: Vec<PiiMatch> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !kept.iter().any(|k| k.overlaps(&candidate)) {
            kept.push(candidate);
        }
    }

    kept.sort_by_key(|m| m.start);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::EntityType;

    fn m(start: usize, end: usize, t: EntityType, confidence: f32) -> PiiMatch {
        PiiMatch::new(start, end, t, confidence)
    }

    #[test]
    fn test_non_overlapping_kept_and_sorted() {
        let resolved = resolve_overlaps(vec![
            m(20, 25, EntityType::Phone, 0.8),
            m(0, 5, EntityType::Email, 0.9),
        ]);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].start, 0);
        assert_eq!(resolved[1].start, 20);
    }

    #[test]
    fn test_higher_confidence_wins() {
        let resolved = resolve_overlaps(vec![
            m(0, 30, EntityType::Url, 0.85),
            m(10, 20, EntityType::Email, 0.95),
        ]);
        assert_eq!(resolved, vec![m(10, 20, EntityType::Email, 0.95)]);
    }

    #[test]
    fn test_confidence_tie_longer_wins() {
        let resolved = resolve_overlaps(vec![
            m(0, 4, EntityType::Phone, 0.8),
            m(2, 12, EntityType::Ssn, 0.8),
        ]);
        assert_eq!(resolved, vec![m(2, 12, EntityType::Ssn, 0.8)]);
    }

    #[test]
    fn test_full_tie_smaller_start_wins() {
        let resolved = resolve_overlaps(vec![
            m(3, 8, EntityType::Phone, 0.8),
            m(0, 5, EntityType::Phone, 0.8),
        ]);
        assert_eq!(resolved, vec![m(0, 5, EntityType::Phone, 0.8)]);
    }

    #[test]
    fn test_identical_spans_resolve_by_label() {
        let a = resolve_overlaps(vec![
            m(0, 5, EntityType::Phone, 0.8),
            m(0, 5, EntityType::IpAddress, 0.8),
        ]);
        let b = resolve_overlaps(vec![
            m(0, 5, EntityType::IpAddress, 0.8),
            m(0, 5, EntityType::Phone, 0.8),
        ]);
        assert_eq!(a, b);
        assert_eq!(a[0].entity_type, EntityType::IpAddress);
    }

    #[test]
    fn test_maximal_set() {
        // The middle span outranks both neighbours it touches; the
        // unrelated span at 12 survives.
        let resolved = resolve_overlaps(vec![
            m(0, 4, EntityType::Phone, 0.7),
            m(3, 7, EntityType::Email, 0.9),
            m(6, 10, EntityType::Phone, 0.7),
            m(12, 14, EntityType::Person, 0.75),
        ]);
        assert_eq!(
            resolved,
            vec![
                m(3, 7, EntityType::Email, 0.9),
                m(12, 14, EntityType::Person, 0.75)
            ]
        );
    }

    #[test]
    fn test_adjacent_spans_do_not_overlap() {
        let resolved = resolve_overlaps(vec![
            m(0, 5, EntityType::Phone, 0.8),
            m(5, 9, EntityType::Email, 0.9),
        ]);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_overlaps(Vec::new()).is_empty());
    }
}
