//! Single-pair BLEU computed the corpus way.
//!
//! Follows the usual reference implementation defaults: 13a tokenization,
//! n-grams up to order 4, clipped counts, brevity penalty, and exponential
//! smoothing of orders with no matches. Scores are reported in `[0, 1]`
//! instead of the conventional `0..100`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MetricError;

/// Highest n-gram order.
pub const MAX_NGRAM_ORDER: usize = 4;

static PAD_SYMBOLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([\x7B-\x7E\x5B-\x60\x20-\x26\x28-\x2B\x3A-\x40\x2F])").unwrap()
});
static PERIOD_COMMA_AFTER_NON_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^0-9])([\.,])").unwrap());
static PERIOD_COMMA_BEFORE_NON_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\.,])([^0-9])").unwrap());
static DASH_AFTER_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9])(-)").unwrap());

/// Tokenize the way the `13a` mteval script does.
pub fn tokenize_13a(line: &str) -> Vec<String> {
    let mut line = line
        .replace("<skipped>", "")
        .replace("-\n", "")
        .replace('\n', " ");
    if line.contains('&') {
        line = line
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    let padded = format!(" {line} ");
    let s = PAD_SYMBOLS.replace_all(&padded, " ${1} ");
    let s = PERIOD_COMMA_AFTER_NON_DIGIT.replace_all(&s, "${1} ${2} ");
    let s = PERIOD_COMMA_BEFORE_NON_DIGIT.replace_all(&s, " ${1} ${2}");
    let s = DASH_AFTER_DIGIT.replace_all(&s, "${1} ${2} ");

    s.split_whitespace().map(str::to_owned).collect()
}

/// Sufficient statistics for one candidate/reference pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BleuStats {
    /// Clipped n-gram matches per order.
    pub correct: [usize; MAX_NGRAM_ORDER],
    /// Candidate n-gram counts per order.
    pub total: [usize; MAX_NGRAM_ORDER],
    pub sys_len: usize,
    pub ref_len: usize,
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

impl BleuStats {
    pub fn collect(candidate: &str, reference: &str) -> Self {
        let sys = tokenize_13a(candidate);
        let refs = tokenize_13a(reference);

        let mut stats = BleuStats {
            sys_len: sys.len(),
            ref_len: refs.len(),
            ..Default::default()
        };

        for n in 1..=MAX_NGRAM_ORDER {
            let sys_counts = ngram_counts(&sys, n);
            let ref_counts = ngram_counts(&refs, n);
            stats.total[n - 1] = sys.len().saturating_sub(n - 1);
            stats.correct[n - 1] = sys_counts
                .iter()
                .map(|(gram, &count)| count.min(ref_counts.get(gram).copied().unwrap_or(0)))
                .sum();
        }

        stats
    }

    /// Brevity penalty.
    pub fn brevity_penalty(&self) -> f64 {
        if self.sys_len >= self.ref_len {
            1.0
        } else if self.sys_len == 0 {
            0.0
        } else {
            (1.0 - self.ref_len as f64 / self.sys_len as f64).exp()
        }
    }

    /// BLEU in `[0, 1]`.
    pub fn score(&self) -> f64 {
        if self.sys_len == 0 || self.correct.iter().all(|&c| c == 0) {
            return 0.0;
        }

        let mut precisions = [0.0f64; MAX_NGRAM_ORDER];
        let mut smooth = 1.0f64;
        for n in 0..MAX_NGRAM_ORDER {
            if self.total[n] == 0 {
                break;
            }
            precisions[n] = if self.correct[n] == 0 {
                smooth *= 2.0;
                1.0 / (smooth * self.total[n] as f64)
            } else {
                self.correct[n] as f64 / self.total[n] as f64
            };
        }

        // An order with no candidate n-grams at all zeroes the geometric mean.
        if precisions.iter().any(|&p| p == 0.0) {
            return 0.0;
        }

        let log_mean = precisions.iter().map(|p| p.ln()).sum::<f64>() / MAX_NGRAM_ORDER as f64;
        self.brevity_penalty() * log_mean.exp()
    }
}

/// BLEU of `candidate` against a single `reference`, in `[0, 1]`.
pub fn sentence_bleu(candidate: &str, reference: &str) -> Result<f64, MetricError> {
    let score = BleuStats::collect(candidate, reference).score();
    if !score.is_finite() {
        return Err(MetricError::NonFinite { metric: "BLEU" });
    }
    Ok(score.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn tokenize_13a_splits_punctuation_but_not_decimals() {
        assert_eq!(tokenize_13a("Hello, world!"), vec!["Hello", ",", "world", "!"]);
        assert_eq!(tokenize_13a("pi is 3.14."), vec!["pi", "is", "3.14", "."]);
        assert_eq!(tokenize_13a("rock&amp;roll"), vec!["rock", "&", "roll"]);
    }

    #[test]
    fn identical_long_sentence_is_perfect() {
        let s = "Please submit your application before the deadline.";
        assert!(approx(sentence_bleu(s, s).unwrap(), 1.0));
    }

    #[test]
    fn identical_three_word_sentence_has_no_4grams() {
        assert_eq!(sentence_bleu("the cat sat", "the cat sat").unwrap(), 0.0);
    }

    #[test]
    fn known_value_without_smoothing() {
        // precisions 6/7, 5/6, 4/5, 3/4 and no brevity penalty
        let score = sentence_bleu("the cat sat on the mat today", "the cat sat on the mat").unwrap();
        assert!(approx(score, (3.0f64 / 7.0).powf(0.25)), "got {score}");
    }

    #[test]
    fn exponential_smoothing_of_empty_orders() {
        // precisions 3/4, 1/3, then smoothed 1/4 and 1/4
        let score = sentence_bleu("a b c d", "a b x d").unwrap();
        let expected = (0.75f64 * (1.0 / 3.0) * 0.25 * 0.25).powf(0.25);
        assert!(approx(score, expected), "got {score}, expected {expected}");
    }

    #[test]
    fn brevity_penalty_applies_to_short_candidates() {
        let stats = BleuStats::collect("a b", "a b c d");
        assert!(approx(stats.brevity_penalty(), (1.0f64 - 2.0).exp()));
    }

    #[test]
    fn no_overlap_is_zero() {
        assert_eq!(sentence_bleu("one two three four", "five six seven eight").unwrap(), 0.0);
    }

    #[test]
    fn empty_inputs_are_zero() {
        assert_eq!(sentence_bleu("", "a b c d").unwrap(), 0.0);
        assert_eq!(sentence_bleu("a b c d", "").unwrap(), 0.0);
    }
}
