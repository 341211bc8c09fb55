//! Translation-quality scoring.
//!
//! [`score`] compares a candidate translation with a reference and always
//! returns the baseline metrics (`p1`, `p2`, `len_ratio`). Enhanced metrics
//! (`BLEU`, `TER`) are layered on top when compiled in; each one is computed
//! independently and simply left out of the result if it fails.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::MetricError;
use crate::ngram::{len_ratio, ngram_precision};

pub const P1: &str = "p1";
pub const P2: &str = "p2";
pub const LEN_RATIO: &str = "len_ratio";
pub const BLEU: &str = "BLEU";
pub const TER: &str = "TER";

/// Metrics every [`ScoreCard`] carries, in display order.
pub const BASELINE_METRICS: [&str; 3] = [P1, P2, LEN_RATIO];

/// Which way a metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
    /// Best at exactly 1.0 (length ratio).
    CloserToOne,
}

impl Direction {
    /// Signed change where a positive value always means "better".
    pub fn improvement(self, before: f64, after: f64) -> f64 {
        match self {
            Direction::HigherIsBetter => after - before,
            Direction::LowerIsBetter => before - after,
            Direction::CloserToOne => (before - 1.0).abs() - (after - 1.0).abs(),
        }
    }
}

/// Direction of a metric by its key. Unknown keys are treated as
/// higher-is-better.
pub fn metric_direction(name: &str) -> Direction {
    match name {
        TER => Direction::LowerIsBetter,
        LEN_RATIO => Direction::CloserToOne,
        _ => Direction::HigherIsBetter,
    }
}

/// Scores for one candidate/reference pair.
///
/// Serializes as a flat map: `{"p1": .., "p2": .., "len_ratio": .., "BLEU": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Unigram precision.
    pub p1: f64,
    /// Bigram precision.
    pub p2: f64,
    /// Candidate/reference token-count ratio.
    pub len_ratio: f64,
    #[serde(flatten)]
    extra: BTreeMap<String, f64>,
}

impl ScoreCard {
    pub fn baseline(p1: f64, p2: f64, len_ratio: f64) -> Self {
        Self {
            p1,
            p2,
            len_ratio,
            extra: BTreeMap::new(),
        }
    }

    /// Look up any metric by key.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            P1 => Some(self.p1),
            P2 => Some(self.p2),
            LEN_RATIO => Some(self.len_ratio),
            other => self.extra.get(other).copied(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Enhanced metrics that were computed.
    pub fn extras(&self) -> &BTreeMap<String, f64> {
        &self.extra
    }

    /// All metrics, baseline first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        BASELINE_METRICS
            .into_iter()
            .zip([self.p1, self.p2, self.len_ratio])
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    /// Copy with every value rounded to `decimals` places, for display.
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        let round = |v: f64| (v * factor).round() / factor;
        Self {
            p1: round(self.p1),
            p2: round(self.p2),
            len_ratio: round(self.len_ratio),
            extra: self.extra.iter().map(|(k, v)| (k.clone(), round(*v))).collect(),
        }
    }

    fn insert_extra(&mut self, name: &str, value: f64) {
        self.extra.insert(name.to_string(), value);
    }
}

/// An optional metric layered on top of the baseline.
pub trait EnhancedMetric: Send + Sync {
    /// Key under which the value is reported.
    fn name(&self) -> &'static str;

    fn compute(&self, candidate: &str, reference: &str) -> Result<f64, MetricError>;
}

/// Corpus-style BLEU on the single pair, in `[0, 1]`.
#[cfg(feature = "bleu")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Bleu;

#[cfg(feature = "bleu")]
impl EnhancedMetric for Bleu {
    fn name(&self) -> &'static str {
        BLEU
    }

    fn compute(&self, candidate: &str, reference: &str) -> Result<f64, MetricError> {
        crate::bleu::sentence_bleu(candidate, reference)
    }
}

/// Translation edit rate over whitespace-split words.
#[cfg(feature = "ter")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Ter;

#[cfg(feature = "ter")]
impl EnhancedMetric for Ter {
    fn name(&self) -> &'static str {
        TER
    }

    fn compute(&self, candidate: &str, reference: &str) -> Result<f64, MetricError> {
        crate::ter::translation_edit_rate(candidate, reference)
    }
}

/// A baseline scorer plus a set of enhanced metrics.
pub struct Scorer {
    metrics: Vec<Box<dyn EnhancedMetric>>,
}

impl Scorer {
    /// Only `p1`, `p2` and `len_ratio`.
    pub fn baseline_only() -> Self {
        Self {
            metrics: Vec::new(),
        }
    }

    /// Every enhanced metric compiled into this build.
    pub fn detect() -> Self {
        #[allow(unused_mut)]
        let mut scorer = Self::baseline_only();
        #[cfg(feature = "bleu")]
        {
            scorer = scorer.with_metric(Bleu);
        }
        #[cfg(feature = "ter")]
        {
            scorer = scorer.with_metric(Ter);
        }
        scorer
    }

    pub fn with_metric(mut self, metric: impl EnhancedMetric + 'static) -> Self {
        self.metrics.push(Box::new(metric));
        self
    }

    /// Keys of the enabled enhanced metrics.
    pub fn enhanced_metrics(&self) -> Vec<&'static str> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    /// Score `candidate` against `reference`. Never fails.
    pub fn score(&self, candidate: &str, reference: &str) -> ScoreCard {
        let mut card = ScoreCard::baseline(
            ngram_precision(candidate, reference, 1),
            ngram_precision(candidate, reference, 2),
            len_ratio(candidate, reference),
        );

        for metric in &self.metrics {
            let name = metric.name();
            match catch_unwind(AssertUnwindSafe(|| metric.compute(candidate, reference))) {
                Ok(Ok(value)) if value.is_finite() => card.insert_extra(name, value),
                Ok(Ok(_)) => {
                    tracing::debug!(metric = name, "metric returned a non-finite value, omitted");
                }
                Ok(Err(e)) => {
                    tracing::debug!(metric = name, error = %e, "metric unavailable for pair, omitted");
                }
                Err(_) => {
                    tracing::debug!(metric = name, "metric panicked, omitted");
                }
            }
        }

        card
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::detect()
    }
}

impl std::fmt::Debug for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorer")
            .field("enhanced", &self.enhanced_metrics())
            .finish()
    }
}

static DEFAULT_SCORER: Lazy<Scorer> = Lazy::new(Scorer::detect);

/// Score with every enhanced metric available in this build.
pub fn score(candidate: &str, reference: &str) -> ScoreCard {
    DEFAULT_SCORER.score(candidate, reference)
}

/// The process-wide scorer used by [`score`].
pub fn default_scorer() -> &'static Scorer {
    &DEFAULT_SCORER
}
