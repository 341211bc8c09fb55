//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `mtlab` running inside `dir`, isolated from any user config or API key.
fn mtlab(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mtlab").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("MTLAB_OPENAI_KEY")
        .env_remove("OPENAI_API_KEY");
    cmd
}

fn seeded() -> TempDir {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .args(["pairs", "seed"])
        .assert()
        .success();
    dir
}

#[test]
fn help_flag() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("post-editing"))
        .stdout(predicate::str::contains("score"))
        .stdout(predicate::str::contains("tickets"))
        .stdout(predicate::str::contains("lab"));
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mtlab"));
}

#[test]
fn score_text() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .args(["score", "--candidate", "the cat sat", "--reference", "the cat sat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scores:"))
        .stdout(predicate::str::contains("p1"))
        .stdout(predicate::str::contains("1.000"));
}

#[test]
fn score_json_baseline_only() {
    let dir = TempDir::new().unwrap();
    let output = mtlab(dir.path())
        .args([
            "score",
            "--candidate",
            "the cat",
            "--reference",
            "the cat sat",
            "--format",
            "json",
            "--baseline-only",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let scores: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(scores["p1"], 1.0);
    assert!((scores["len_ratio"].as_f64().unwrap() - 2.0 / 3.0).abs() < 1e-9);
    assert!(scores.get("BLEU").is_none());
    assert!(scores.get("TER").is_none());
}

#[test]
fn score_json_includes_enhanced_metrics() {
    let dir = TempDir::new().unwrap();
    let output = mtlab(dir.path())
        .args([
            "score",
            "--candidate",
            "the cat sat on the mat",
            "--reference",
            "the cat sat on the mat",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let scores: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(scores.get("BLEU").is_some());
    assert_eq!(scores["TER"], 0.0);
}

#[test]
fn score_unknown_format_fails() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .args(["score", "--candidate", "a", "--reference", "a", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn init_creates_files_once() {
    let dir = TempDir::new().unwrap();

    mtlab(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created mtlab.toml"));

    assert!(dir.path().join("mtlab.toml").exists());
    assert!(dir.path().join("data/sample_pairs.csv").exists());
    assert!(dir.path().join("data/tickets.csv").exists());

    mtlab(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("mtlab.toml already exists, skipping."));
}

#[test]
fn pairs_seed_list_validate() {
    let dir = seeded();

    mtlab(dir.path())
        .args(["pairs", "seed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    mtlab(dir.path())
        .args(["pairs", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Please submit your application"))
        .stdout(predicate::str::contains("en→ar"));

    mtlab(dir.path())
        .args(["pairs", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 pairs"))
        .stdout(predicate::str::contains("Dataset valid."));
}

#[test]
fn pairs_validate_reports_problems() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("sample_pairs.csv"),
        "id,source,reference\n1,Hello,مرحبا\n1,Again,\n",
    )
    .unwrap();

    mtlab(dir.path())
        .args(["pairs", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING [1]"))
        .stdout(predicate::str::contains("warning(s)"));
}

#[test]
fn pairs_list_without_dataset() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .args(["pairs", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pairs"));
}

#[test]
fn ticket_workflow() {
    let dir = TempDir::new().unwrap();

    mtlab(dir.path())
        .args([
            "tickets",
            "add",
            "--id",
            "T1",
            "--source",
            "The policy changed.",
            "--reference",
            "تغيرت السياسة.",
            "--due-date",
            "2026-11-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added ticket T1"));

    mtlab(dir.path())
        .args(["tickets", "add", "--id", "T1", "--source", "Again."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    mtlab(dir.path())
        .args(["tickets", "list", "--open"])
        .assert()
        .success()
        .stdout(predicate::str::contains("T1"))
        .stdout(predicate::str::contains("2026-11-01"));

    mtlab(dir.path())
        .args(["tickets", "claim", "--id", "T1", "--student", "sara"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ticket T1 claimed by sara"));

    mtlab(dir.path())
        .args(["tickets", "claim", "--id", "T1", "--student", "omar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already assigned to sara"));

    mtlab(dir.path())
        .args(["tickets", "list", "--student", "sara"])
        .assert()
        .success()
        .stdout(predicate::str::contains("claimed"));

    mtlab(dir.path())
        .args([
            "submit",
            "--student",
            "omar",
            "--ticket",
            "T1",
            "--post-edit",
            "تغيرت السياسة.",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("assigned to sara"));

    mtlab(dir.path())
        .args([
            "submit",
            "--student",
            "sara",
            "--ticket",
            "T1",
            "--mt-output",
            "السياسة تغيرت.",
            "--post-edit",
            "تغيرت السياسة.",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved submission from sara (ticket T1)"))
        .stdout(predicate::str::contains("1.000"));

    let results = std::fs::read_to_string(dir.path().join("data/results.csv")).unwrap();
    assert!(results.contains("ticket_id"));
    assert!(results.contains("metric_p1"));
    assert!(results.contains("sara"));

    mtlab(dir.path())
        .args(["tickets", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("submitted"));

    // Submitted tickets drop out of the student's active list.
    mtlab(dir.path())
        .args(["tickets", "list", "--student", "sara"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tickets."));
}

#[test]
fn tickets_import_replaces_file() {
    let dir = TempDir::new().unwrap();
    let upload = dir.path().join("upload.csv");
    std::fs::write(
        &upload,
        "ticket_id,source,reference,src_lang,tgt_lang,assigned_to,due_date,status,points\n\
         A1,One,واحد,en,ar,,,open,5\n\
         A2,Two,,en,ar,layla,2026-12-01,claimed,10\n",
    )
    .unwrap();

    mtlab(dir.path())
        .args(["tickets", "import", "--file"])
        .arg(&upload)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 tickets"));

    mtlab(dir.path())
        .args(["tickets", "list", "--student", "layla"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A2"))
        .stdout(predicate::str::contains("A1").not());
}

#[test]
fn submit_pairs_item() {
    let dir = seeded();

    mtlab(dir.path())
        .args([
            "submit",
            "--student",
            "omar",
            "--item",
            "2",
            "--mt-output",
            "تنصح السلطات الصحية بشرب الماء بانتظام.",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved submission from omar (pairs 2)"))
        .stdout(predicate::str::contains("p2"));

    let results = std::fs::read_to_string(dir.path().join("data/results.csv")).unwrap();
    assert!(results.contains("item_id"));
    assert!(results.contains("omar"));
}

#[test]
fn submit_requires_text() {
    let dir = seeded();
    mtlab(dir.path())
        .args(["submit", "--student", "omar", "--item", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to score"));

    assert!(!dir.path().join("data/results.csv").exists());
}

#[test]
fn submit_unknown_item_fails() {
    let dir = seeded();
    mtlab(dir.path())
        .args(["submit", "--student", "omar", "--item", "99", "--post-edit", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("item 99 not found"));
}

#[test]
fn submit_ticket_without_reference() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .args(["tickets", "add", "--id", "T9", "--source", "Open question."])
        .assert()
        .success();

    mtlab(dir.path())
        .args(["submit", "--student", "layla", "--ticket", "T9", "--post-edit", "سؤال مفتوح."])
        .assert()
        .success()
        .stdout(predicate::str::contains("saved without metrics"));

    let results = std::fs::read_to_string(dir.path().join("data/results.csv")).unwrap();
    assert!(results.contains("T9"));
    assert!(!results.contains("metric_p1"));
}

fn write_report(path: &Path, model: &str, p2: &[(&str, f64)]) {
    let results: Vec<serde_json::Value> = p2
        .iter()
        .map(|(id, score)| {
            serde_json::json!({
                "item_id": id,
                "source": "src",
                "reference": "ref",
                "mt_output": "out",
                "model": model,
                "scores": {"p1": 0.5, "p2": score, "len_ratio": 1.0},
                "latency_ms": 10,
                "attempts": 1
            })
        })
        .collect();
    let report = serde_json::json!({
        "id": uuid::Uuid::new_v4(),
        "created_at": chrono::Utc::now(),
        "engine": "mock",
        "model": model,
        "results": results,
        "failures": [],
        "summary": {"items": p2.len(), "failed": 0, "means": {}, "avg_latency_ms": 10},
        "duration_ms": 100
    });
    std::fs::write(path, serde_json::to_string_pretty(&report).unwrap()).unwrap();
}

#[test]
fn compare_detects_regression() {
    let dir = TempDir::new().unwrap();
    let baseline = dir.path().join("baseline.json");
    let current = dir.path().join("current.json");
    write_report(&baseline, "m1", &[("1", 0.8), ("2", 0.4), ("3", 0.5)]);
    write_report(&current, "m2", &[("1", 0.3), ("2", 0.9), ("3", 0.52)]);

    mtlab(dir.path())
        .args(["compare", "--baseline", "baseline.json", "--current", "current.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Comparison on p2: 1 regressions, 1 improvements, 1 unchanged",
        ))
        .stdout(predicate::str::contains("1 0.800 -> 0.300"));

    mtlab(dir.path())
        .args([
            "compare",
            "--baseline",
            "baseline.json",
            "--current",
            "current.json",
            "--fail-on-regression",
        ])
        .assert()
        .code(1);

    mtlab(dir.path())
        .args([
            "compare",
            "--baseline",
            "baseline.json",
            "--current",
            "current.json",
            "--format",
            "markdown",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("|"));
}

#[test]
fn compare_without_regression_passes_gate() {
    let dir = TempDir::new().unwrap();
    let baseline = dir.path().join("a.json");
    let current = dir.path().join("b.json");
    write_report(&baseline, "m1", &[("1", 0.5)]);
    write_report(&current, "m1", &[("1", 0.6), ("2", 0.1)]);

    mtlab(dir.path())
        .args(["compare", "--baseline", "a.json", "--current", "b.json", "--fail-on-regression"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 new item(s)"));
}

#[test]
fn compare_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .args(["compare", "--baseline", "nope.json", "--current", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read report"));
}

#[test]
fn export_overview() {
    let dir = seeded();
    for (student, item) in [("sara", "1"), ("omar", "3")] {
        mtlab(dir.path())
            .args(["submit", "--student", student, "--item", item, "--post-edit", "نص"])
            .assert()
            .success();
    }

    mtlab(dir.path())
        .args(["export", "--output", "out/overview.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Exported overview of 2 submissions from 2 students",
        ));

    let html = std::fs::read_to_string(dir.path().join("out/overview.html")).unwrap();
    assert!(html.contains("mtlab class overview"));
    assert!(html.contains("sara"));
    assert!(html.contains("omar"));

    mtlab(dir.path())
        .args(["export", "--format", "json", "--output", "overview.json"])
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("overview.json")).unwrap())
            .unwrap();
    assert_eq!(json["total_submissions"], 2);
}

#[test]
fn export_empty_log() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .args(["export"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No submissions yet"))
        .stdout(predicate::str::contains("0 submissions from 0 students"));
    assert!(dir.path().join("mtlab-overview.html").exists());
}

#[test]
fn lab_with_reverse_engine() {
    let dir = seeded();

    mtlab(dir.path())
        .args(["lab", "--engine", "reverse", "--output", "results", "--format", "all"])
        .assert()
        .success()
        .stderr(predicate::str::contains("3 items, 0 failed"));

    let files: Vec<String> = std::fs::read_dir(dir.path().join("results"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(files.iter().any(|f| f.starts_with("lab-") && f.ends_with(".json")));
    assert!(files.iter().any(|f| f.starts_with("lab-") && f.ends_with(".html")));
}

#[test]
fn lab_without_pairs_fails() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .args(["lab", "--engine", "reverse"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mtlab pairs seed"));
}

#[test]
fn lab_openai_without_key_reports_failures() {
    let dir = seeded();
    mtlab(dir.path())
        .args(["lab", "--engine", "openai", "--output", "results"])
        .assert()
        .success()
        .stderr(predicate::str::contains("3 failed"));
}

#[test]
fn lab_unknown_engine_fails() {
    let dir = seeded();
    mtlab(dir.path())
        .args(["lab", "--engine", "nonexistent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent"));
}

#[test]
fn translate_with_reverse_engine() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .args(["translate", "--engine", "reverse", "--text", "hello there world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("world there hello [AR]"));
}

#[test]
fn health_lists_sections() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("Metrics:"))
        .stdout(predicate::str::contains("p1, p2, len_ratio"))
        .stdout(predicate::str::contains("openai (default): type openai, no API key"))
        .stdout(predicate::str::contains("reverse"))
        .stdout(predicate::str::contains("OPENAI_API_KEY: not set"))
        .stdout(predicate::str::contains("sample_pairs.csv: missing"));
}

#[test]
fn health_sees_key_from_env() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .env("MTLAB_OPENAI_KEY", "sk-test")
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("openai (default): type openai, ready"))
        .stdout(predicate::str::contains("MTLAB_OPENAI_KEY: set"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    mtlab(dir.path())
        .args(["health", "--config", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
