//! Aggregate statistics over scored items.
//!
//! Means are taken per metric over the items that actually carry that
//! metric, so a missing `BLEU` never drags an average towards zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::report::LabResult;

/// Mean of one metric over the items that have it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricMean {
    pub mean: f64,
    /// Items that contributed.
    pub count: usize,
}

/// Running per-metric sums.
#[derive(Debug, Clone, Default)]
pub struct MetricAccumulator {
    sums: BTreeMap<String, (f64, usize)>,
}

impl MetricAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one value. Non-finite values are ignored.
    pub fn add(&mut self, metric: &str, value: f64) {
        if !value.is_finite() {
            return;
        }
        let entry = self.sums.entry(metric.to_string()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    pub fn extend<'a>(&mut self, values: impl IntoIterator<Item = (&'a str, f64)>) {
        for (metric, value) in values {
            self.add(metric, value);
        }
    }

    pub fn finish(&self) -> BTreeMap<String, MetricMean> {
        self.sums
            .iter()
            .map(|(metric, &(sum, count))| {
                (
                    metric.clone(),
                    MetricMean {
                        mean: sum / count as f64,
                        count,
                    },
                )
            })
            .collect()
    }
}

/// Summary of a lab run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabSummary {
    /// Items translated and scored.
    pub items: usize,
    /// Items that failed to translate.
    pub failed: usize,
    /// Per-metric means.
    pub means: BTreeMap<String, MetricMean>,
    /// Average engine latency in milliseconds.
    pub avg_latency_ms: u64,
}

impl LabSummary {
    pub fn mean(&self, metric: &str) -> Option<f64> {
        self.means.get(metric).map(|m| m.mean)
    }
}

/// Compute the summary of a set of lab results.
pub fn compute_summary(results: &[LabResult], failed: usize) -> LabSummary {
    let mut acc = MetricAccumulator::new();
    for r in results {
        acc.extend(r.scores.iter());
    }

    let avg_latency_ms = results.iter().map(|r| r.latency_ms).sum::<u64>() / results.len().max(1) as u64;

    LabSummary {
        items: results.len(),
        failed,
        means: acc.finish(),
        avg_latency_ms,
    }
}
