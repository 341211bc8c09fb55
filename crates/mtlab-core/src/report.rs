//! Lab report types with JSON persistence and run-to-run comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::{metric_direction, Direction, ScoreCard};
use crate::statistics::LabSummary;

/// A complete lab run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Engine that produced the translations.
    pub engine: String,
    /// Model requested from the engine.
    pub model: String,
    /// Scored translations, in dataset order.
    pub results: Vec<LabResult>,
    /// Items the engine could not translate.
    #[serde(default)]
    pub failures: Vec<LabFailure>,
    /// Aggregate statistics.
    pub summary: LabSummary,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// One translated and scored dataset item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabResult {
    pub item_id: String,
    pub source: String,
    pub reference: String,
    pub mt_output: String,
    pub model: String,
    pub scores: ScoreCard,
    pub latency_ms: u64,
    /// Attempts needed, including the successful one.
    pub attempts: u32,
}

/// An item that never produced a translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabFailure {
    pub item_id: String,
    pub error: String,
}

impl LabReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: LabReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this run against a baseline on one metric.
    ///
    /// A change counts only when it exceeds `threshold` in the metric's
    /// own direction (for `TER`, a drop is an improvement).
    pub fn compare(&self, baseline: &LabReport, metric: &str, threshold: f64) -> ComparisonReport {
        let direction = metric_direction(metric);

        let metric_map = |report: &LabReport| -> HashMap<String, Option<f64>> {
            report
                .results
                .iter()
                .map(|r| (r.item_id.clone(), r.scores.get(metric)))
                .collect()
        };

        let baseline_scores = metric_map(baseline);
        let current_scores = metric_map(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_items = 0usize;
        let mut missing_metric = 0usize;

        for (item_id, current) in &current_scores {
            let Some(baseline_val) = baseline_scores.get(item_id) else {
                new_items += 1;
                continue;
            };
            let (Some(before), Some(after)) = (*baseline_val, *current) else {
                missing_metric += 1;
                continue;
            };

            let change = ScoreChange {
                item_id: item_id.clone(),
                baseline_score: before,
                current_score: after,
                delta: after - before,
            };
            let gain = direction.improvement(before, after);
            if gain < -threshold {
                regressions.push(change);
            } else if gain > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_items = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(*k))
            .count();

        regressions.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        improvements.sort_by(|a, b| a.item_id.cmp(&b.item_id));

        ComparisonReport {
            metric: metric.to_string(),
            direction,
            regressions,
            improvements,
            unchanged,
            new_items,
            removed_items,
            missing_metric,
        }
    }
}

/// Result of comparing two lab runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Metric the comparison was made on.
    pub metric: String,
    pub direction: Direction,
    /// Items that got worse.
    pub regressions: Vec<ScoreChange>,
    /// Items that got better.
    pub improvements: Vec<ScoreChange>,
    /// Items with no significant change.
    pub unchanged: usize,
    /// Items in current but not baseline.
    pub new_items: usize,
    /// Items in baseline but not current.
    pub removed_items: usize,
    /// Items where either run lacks the metric.
    pub missing_metric: usize,
}

/// A per-item score change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreChange {
    pub item_id: String,
    pub baseline_score: f64,
    pub current_score: f64,
    /// Raw `current - baseline`, regardless of direction.
    pub delta: f64,
}

impl ComparisonReport {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**{}:** {} regressions, {} improvements, {} unchanged\n\n",
            self.metric,
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (title, rows) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if rows.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Item | Baseline | Current | Delta |\n");
            md.push_str("|------|----------|---------|-------|\n");
            for r in rows {
                md.push_str(&format!(
                    "| {} | {:.3} | {:.3} | {:+.3} |\n",
                    r.item_id, r.baseline_score, r.current_score, r.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}
