//! Regression detection integration tests.
//!
//! Tests the report comparison workflow end-to-end, including
//! JSON serialization, report loading, and regression detection.

use mtlab_core::report::{LabReport, LabResult};
use mtlab_core::scoring::{Direction, ScoreCard};
use mtlab_core::statistics::compute_summary;
use uuid::Uuid;

fn scores(json: serde_json::Value) -> ScoreCard {
    serde_json::from_value(json).unwrap()
}

fn make_result(item_id: &str, model: &str, scores: ScoreCard) -> LabResult {
    LabResult {
        item_id: item_id.into(),
        source: format!("source {item_id}"),
        reference: format!("reference {item_id}"),
        mt_output: format!("output {item_id}"),
        model: model.into(),
        scores,
        latency_ms: 120,
        attempts: 1,
    }
}

fn make_report(model: &str, results: Vec<LabResult>) -> LabReport {
    let summary = compute_summary(&results, 0);
    LabReport {
        id: Uuid::new_v4(),
        created_at: chrono::Utc::now(),
        engine: "test".into(),
        model: model.into(),
        results,
        failures: vec![],
        summary,
        duration_ms: 1000,
    }
}

fn round_trip(report: &LabReport) -> LabReport {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.save_json(&path).unwrap();
    LabReport::load_json(&path).unwrap()
}

#[test]
fn no_regression_between_identical_runs() {
    let results = vec![
        make_result("1", "m", ScoreCard::baseline(0.8, 0.6, 1.0)),
        make_result("2", "m", ScoreCard::baseline(0.5, 0.3, 0.9)),
    ];
    let baseline = round_trip(&make_report("m", results.clone()));
    let current = round_trip(&make_report("m", results));

    let comparison = current.compare(&baseline, "p2", 0.05);
    assert!(!comparison.has_regressions());
    assert!(comparison.improvements.is_empty());
    assert_eq!(comparison.unchanged, 2);
}

#[test]
fn p2_drop_is_a_regression() {
    let baseline = round_trip(&make_report(
        "m1",
        vec![
            make_result("1", "m1", ScoreCard::baseline(0.9, 0.8, 1.0)),
            make_result("2", "m1", ScoreCard::baseline(0.9, 0.7, 1.0)),
        ],
    ));
    let current = round_trip(&make_report(
        "m2",
        vec![
            make_result("1", "m2", ScoreCard::baseline(0.9, 0.2, 1.0)),
            make_result("2", "m2", ScoreCard::baseline(0.9, 0.72, 1.0)),
        ],
    ));

    let comparison = current.compare(&baseline, "p2", 0.05);
    assert_eq!(comparison.direction, Direction::HigherIsBetter);
    assert_eq!(comparison.regressions.len(), 1);
    assert_eq!(comparison.regressions[0].item_id, "1");
    assert!((comparison.regressions[0].delta + 0.6).abs() < 1e-9);
    assert_eq!(comparison.unchanged, 1);
}

#[test]
fn ter_rise_is_a_regression_and_drop_an_improvement() {
    let baseline = round_trip(&make_report(
        "m1",
        vec![
            make_result("1", "m1", scores(serde_json::json!({"p1": 0.5, "p2": 0.4, "len_ratio": 1.0, "TER": 0.2}))),
            make_result("2", "m1", scores(serde_json::json!({"p1": 0.5, "p2": 0.4, "len_ratio": 1.0, "TER": 0.6}))),
        ],
    ));
    let current = round_trip(&make_report(
        "m2",
        vec![
            make_result("1", "m2", scores(serde_json::json!({"p1": 0.5, "p2": 0.4, "len_ratio": 1.0, "TER": 0.5}))),
            make_result("2", "m2", scores(serde_json::json!({"p1": 0.5, "p2": 0.4, "len_ratio": 1.0, "TER": 0.1}))),
        ],
    ));

    let comparison = current.compare(&baseline, "TER", 0.05);
    assert_eq!(comparison.direction, Direction::LowerIsBetter);
    assert_eq!(comparison.regressions.len(), 1);
    assert_eq!(comparison.regressions[0].item_id, "1");
    assert_eq!(comparison.improvements.len(), 1);
    assert_eq!(comparison.improvements[0].item_id, "2");
}

#[test]
fn metric_missing_on_one_side_is_counted() {
    let baseline = round_trip(&make_report(
        "m1",
        vec![make_result(
            "1",
            "m1",
            scores(serde_json::json!({"p1": 0.5, "p2": 0.4, "len_ratio": 1.0, "BLEU": 0.3})),
        )],
    ));
    let current = round_trip(&make_report(
        "m2",
        vec![make_result("1", "m2", ScoreCard::baseline(0.5, 0.4, 1.0))],
    ));

    let comparison = current.compare(&baseline, "BLEU", 0.05);
    assert_eq!(comparison.missing_metric, 1);
    assert!(!comparison.has_regressions());
}

#[test]
fn added_and_removed_items() {
    let baseline = make_report(
        "m1",
        vec![
            make_result("1", "m1", ScoreCard::baseline(0.5, 0.5, 1.0)),
            make_result("gone", "m1", ScoreCard::baseline(0.5, 0.5, 1.0)),
        ],
    );
    let current = make_report(
        "m2",
        vec![
            make_result("1", "m2", ScoreCard::baseline(0.5, 0.5, 1.0)),
            make_result("new", "m2", ScoreCard::baseline(0.1, 0.1, 1.0)),
        ],
    );

    let comparison = current.compare(&baseline, "p2", 0.05);
    assert_eq!(comparison.new_items, 1);
    assert_eq!(comparison.removed_items, 1);
    assert_eq!(comparison.unchanged, 1);
    assert!(!comparison.has_regressions());
}

#[test]
fn summary_survives_round_trip() {
    let report = make_report(
        "m",
        vec![
            make_result("1", "m", scores(serde_json::json!({"p1": 1.0, "p2": 0.5, "len_ratio": 1.0, "BLEU": 0.4}))),
            make_result("2", "m", ScoreCard::baseline(0.0, 0.0, 0.5)),
        ],
    );
    let loaded = round_trip(&report);

    assert_eq!(loaded.summary, report.summary);
    assert_eq!(loaded.summary.mean("p1"), Some(0.5));
    assert_eq!(loaded.summary.means["BLEU"].count, 1);
    assert_eq!(loaded.results[0].scores.get("BLEU"), Some(0.4));
}
