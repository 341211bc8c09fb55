//! Class overview built from the submissions log.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use mtlab_core::model::METRIC_COLUMN_PREFIX;
use mtlab_core::scoring::{BASELINE_METRICS, P2};
use mtlab_core::statistics::{MetricAccumulator, MetricMean};

/// How many submissions the "recent" table keeps.
pub const RECENT_LIMIT: usize = 20;

const ANONYMOUS: &str = "(anonymous)";

/// Aggregated view of everything students have submitted.
#[derive(Debug, Clone, Serialize)]
pub struct ClassOverview {
    pub generated_at: DateTime<Utc>,
    pub total_submissions: usize,
    /// Per-student rows, sorted by name.
    pub students: Vec<StudentSummary>,
    pub class_means: BTreeMap<String, MetricMean>,
    /// Newest first.
    pub recent: Vec<RecentSubmission>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentSummary {
    pub student: String,
    pub submissions: usize,
    /// Submissions made against tickets rather than the pairs dataset.
    pub ticket_submissions: usize,
    pub means: BTreeMap<String, MetricMean>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentSubmission {
    pub timestamp: Option<DateTime<Utc>>,
    pub student: String,
    pub mode: String,
    pub item: String,
    /// Post-edit, or the raw MT output when nothing was edited.
    pub text: String,
    pub scores: BTreeMap<String, f64>,
}

impl ClassOverview {
    /// Metric names present anywhere, baseline metrics first.
    pub fn metric_names(&self) -> Vec<String> {
        ordered_metrics(self.class_means.keys().map(String::as_str))
    }

    /// Student with the best mean `p2`, if anyone has one.
    pub fn top_student(&self) -> Option<&StudentSummary> {
        self.students
            .iter()
            .filter(|s| s.means.contains_key(P2))
            .max_by(|a, b| a.means[P2].mean.total_cmp(&b.means[P2].mean))
    }
}

/// Baseline metrics in their fixed order, then the rest alphabetically.
pub fn ordered_metrics<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<&str> = names.into_iter().collect();
    let mut ordered: Vec<String> = BASELINE_METRICS
        .iter()
        .filter(|m| names.contains(*m))
        .map(|m| m.to_string())
        .collect();
    let mut rest: Vec<String> = names
        .iter()
        .filter(|n| !BASELINE_METRICS.contains(*n))
        .map(|n| n.to_string())
        .collect();
    rest.sort();
    rest.dedup();
    ordered.extend(rest);
    ordered
}

fn metric_values(row: &BTreeMap<String, String>) -> BTreeMap<String, f64> {
    row.iter()
        .filter_map(|(column, value)| {
            let metric = column.strip_prefix(METRIC_COLUMN_PREFIX)?;
            let value: f64 = value.trim().parse().ok()?;
            value.is_finite().then(|| (metric.to_string(), value))
        })
        .collect()
}

fn field<'a>(row: &'a BTreeMap<String, String>, column: &str) -> &'a str {
    row.get(column).map(|s| s.trim()).unwrap_or("")
}

/// Aggregate results-log rows (column → value) into a class overview.
pub fn build_overview(rows: &[BTreeMap<String, String>]) -> ClassOverview {
    let mut class_acc = MetricAccumulator::new();
    let mut per_student: BTreeMap<String, (usize, usize, MetricAccumulator)> = BTreeMap::new();
    let mut recent = Vec::with_capacity(rows.len());

    for row in rows {
        let student = match field(row, "student") {
            "" => ANONYMOUS.to_string(),
            s => s.to_string(),
        };
        let mode = field(row, "mode").to_string();
        let scores = metric_values(row);

        class_acc.extend(scores.iter().map(|(k, v)| (k.as_str(), *v)));
        let entry = per_student
            .entry(student.clone())
            .or_insert_with(|| (0, 0, MetricAccumulator::new()));
        entry.0 += 1;
        if mode == "ticket" {
            entry.1 += 1;
        }
        entry.2.extend(scores.iter().map(|(k, v)| (k.as_str(), *v)));

        let item = match field(row, "ticket_id") {
            "" => field(row, "item_id"),
            id => id,
        };
        let text = match field(row, "post_edit") {
            "" => field(row, "mt_output"),
            pe => pe,
        };
        let timestamp = field(row, "timestamp")
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        recent.push(RecentSubmission {
            timestamp,
            student,
            mode,
            item: item.to_string(),
            text: text.to_string(),
            scores,
        });
    }

    // The log is append-only, so file order is submission order.
    recent.reverse();
    recent.truncate(RECENT_LIMIT);

    let students = per_student
        .into_iter()
        .map(|(student, (submissions, ticket_submissions, acc))| StudentSummary {
            student,
            submissions,
            ticket_submissions,
            means: acc.finish(),
        })
        .collect();

    ClassOverview {
        generated_at: Utc::now(),
        total_submissions: rows.len(),
        students,
        class_means: class_acc.finish(),
        recent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> BTreeMap<String, String> {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn aggregates_per_student() {
        let rows = vec![
            row(&[
                ("timestamp", "1700000000"),
                ("student", "sara"),
                ("mode", "pairs"),
                ("item_id", "1"),
                ("post_edit", "edited"),
                ("metric_p1", "0.5"),
                ("metric_p2", "0.25"),
            ]),
            row(&[
                ("student", "sara"),
                ("mode", "ticket"),
                ("ticket_id", "T1"),
                ("mt_output", "raw"),
                ("metric_p1", "1.0"),
                ("metric_BLEU", "0.4"),
            ]),
            row(&[("student", "omar"), ("mode", "ticket"), ("ticket_id", "T2")]),
        ];

        let overview = build_overview(&rows);
        assert_eq!(overview.total_submissions, 3);

        let names: Vec<&str> = overview.students.iter().map(|s| s.student.as_str()).collect();
        assert_eq!(names, vec!["omar", "sara"]);

        let sara = &overview.students[1];
        assert_eq!(sara.submissions, 2);
        assert_eq!(sara.ticket_submissions, 1);
        assert_eq!(sara.means["p1"], MetricMean { mean: 0.75, count: 2 });
        assert_eq!(sara.means["BLEU"].count, 1);
        assert!(overview.students[0].means.is_empty());

        assert_eq!(overview.recent[0].student, "omar");
        assert_eq!(overview.recent[1].item, "T1");
        assert_eq!(overview.recent[1].text, "raw");
        assert_eq!(overview.recent[2].text, "edited");
        assert!(overview.recent[2].timestamp.is_some());

        assert_eq!(overview.metric_names(), vec!["p1", "p2", "BLEU"]);
        assert_eq!(overview.top_student().unwrap().student, "sara");
    }

    #[test]
    fn unparseable_metrics_and_missing_student() {
        let rows = vec![row(&[("metric_p1", "n/a"), ("metric_TER", "NaN"), ("metric_p2", " 0.5 ")])];
        let overview = build_overview(&rows);
        assert_eq!(overview.students[0].student, ANONYMOUS);
        assert_eq!(overview.metric_names(), vec!["p2"]);
    }

    #[test]
    fn recent_is_capped() {
        let rows: Vec<_> = (0..RECENT_LIMIT + 5)
            .map(|i| row(&[("student", "s"), ("item_id", &i.to_string())]))
            .collect();
        let overview = build_overview(&rows);
        assert_eq!(overview.recent.len(), RECENT_LIMIT);
        assert_eq!(overview.recent[0].item, (RECENT_LIMIT + 4).to_string());
    }

    #[test]
    fn empty_log() {
        let overview = build_overview(&[]);
        assert_eq!(overview.total_submissions, 0);
        assert!(overview.students.is_empty());
        assert!(overview.top_student().is_none());
    }
}
