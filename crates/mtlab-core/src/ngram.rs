//! Baseline metrics: n-gram precision and length ratio.
//!
//! These need no optional capability and always succeed.

use std::collections::HashSet;

use crate::tokenize::{token_count, tokenize};

/// Smoothing term that keeps [`len_ratio`] finite on an empty reference.
pub const LEN_RATIO_EPSILON: f64 = 1e-9;

/// Fraction of candidate n-grams found anywhere in the reference.
///
/// Candidate n-grams are counted with multiplicity; reference n-grams are
/// compared as a set. Returns `0.0` when either side has fewer than `n`
/// tokens, and when `n == 0`.
pub fn ngram_precision(candidate: &str, reference: &str, n: usize) -> f64 {
    let cand = tokenize(candidate);
    let refs = tokenize(reference);
    if n == 0 || cand.len() < n || refs.len() < n {
        return 0.0;
    }

    // Tokens never contain whitespace, so comparing windows is the same as
    // comparing space-joined n-grams.
    let ref_ngrams: HashSet<&[&str]> = refs.windows(n).collect();
    let total = cand.len() - n + 1;
    let matched = cand
        .windows(n)
        .filter(|gram| ref_ngrams.contains(gram))
        .count();

    matched as f64 / total as f64
}

/// Ratio of candidate to reference token counts.
///
/// Near `1.0` means comparable verbosity; well above flags padding, well
/// below flags omission.
pub fn len_ratio(candidate: &str, reference: &str) -> f64 {
    (token_count(candidate) as f64 + LEN_RATIO_EPSILON)
        / (token_count(reference) as f64 + LEN_RATIO_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_has_full_precision() {
        let s = "The museum will extend its opening hours.";
        assert_eq!(ngram_precision(s, s, 1), 1.0);
        assert_eq!(ngram_precision(s, s, 2), 1.0);
    }

    #[test]
    fn short_candidate_scores_zero() {
        assert_eq!(ngram_precision("hi", "a b c", 2), 0.0);
    }

    #[test]
    fn short_reference_scores_zero() {
        assert_eq!(ngram_precision("a b c", "a", 2), 0.0);
    }

    #[test]
    fn zero_order_is_guarded() {
        assert_eq!(ngram_precision("a b", "a b", 0), 0.0);
    }

    #[test]
    fn candidate_duplicates_count_individually() {
        // "the" matches twice, "cat" once, "dog" never: 3 / 4
        let p = ngram_precision("the the cat dog", "the cat", 1);
        assert!((p - 0.75).abs() < 1e-12, "got {p}");
    }

    #[test]
    fn word_order_only_shows_in_bigrams() {
        assert_eq!(ngram_precision("the cat sat", "sat the cat", 1), 1.0);
        let p2 = ngram_precision("the cat sat", "sat the cat", 2);
        assert!((p2 - 0.5).abs() < 1e-12, "got {p2}");
    }

    #[test]
    fn len_ratio_of_identical_text_is_one() {
        let r = len_ratio("a b c", "a b c");
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn len_ratio_empty_reference_is_large_and_finite() {
        let r = len_ratio("a b", "");
        assert!(r.is_finite());
        assert!(r > 1e8);
    }

    #[test]
    fn len_ratio_empty_candidate_is_near_zero() {
        let r = len_ratio("", "a b c d");
        assert!(r > 0.0);
        assert!(r < 1e-9);
    }
}
