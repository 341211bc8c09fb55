//! HTML report generator.
//!
//! Produces self-contained HTML files with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use mtlab_core::report::LabReport;
use mtlab_core::scoring::P2;

use crate::overview::{ordered_metrics, ClassOverview};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn page_start(title: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");
    html
}

fn page_end(html: &mut String) {
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");
    html.push_str("</body>\n</html>");
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}

/// Generate the class overview page.
pub fn generate_overview_html(overview: &ClassOverview) -> String {
    let metrics = overview.metric_names();
    let mut html = page_start("mtlab class overview");

    html.push_str("<header>\n");
    html.push_str("<h1>mtlab class overview</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} submissions | {} students | {}</p>\n",
        overview.total_submissions,
        overview.students.len(),
        overview.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Per-student table
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Students</h2>\n");
    html.push_str("<table class=\"summary sortable\" id=\"students\">\n<thead><tr>");
    html.push_str("<th>Student</th><th>Submissions</th><th>Tickets</th>");
    for m in &metrics {
        html.push_str(&format!("<th>{}</th>", html_escape(m)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for s in &overview.students {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td>",
            html_escape(&s.student),
            s.submissions,
            s.ticket_submissions
        ));
        for m in &metrics {
            html.push_str(&format!("<td>{}</td>", cell(s.means.get(m).map(|v| v.mean))));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("<tr class=\"total\"><td>Class</td>");
    html.push_str(&format!("<td>{}</td><td></td>", overview.total_submissions));
    for m in &metrics {
        html.push_str(&format!(
            "<td>{}</td>",
            cell(overview.class_means.get(m).map(|v| v.mean))
        ));
    }
    html.push_str("</tr>\n</tbody></table>\n");

    let bars: Vec<(String, f64)> = overview
        .students
        .iter()
        .filter_map(|s| s.means.get(P2).map(|m| (s.student.clone(), m.mean)))
        .collect();
    if !bars.is_empty() {
        html.push_str("<h3>Mean bigram precision (p2)</h3>\n");
        html.push_str(&generate_bar_chart(&bars));
    }
    html.push_str("</section>\n");

    // Recent submissions
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Recent submissions</h2>\n");
    html.push_str("<table class=\"results-table sortable\" id=\"recent\">\n<thead><tr>");
    html.push_str("<th>Time</th><th>Student</th><th>Mode</th><th>Item</th><th>Text</th>");
    for m in &metrics {
        html.push_str(&format!("<th>{}</th>", html_escape(m)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for r in &overview.recent {
        let time = r
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td dir=\"auto\">{}</td>",
            time,
            html_escape(&r.student),
            html_escape(&r.mode),
            html_escape(&r.item),
            html_escape(&r.text)
        ));
        for m in &metrics {
            html.push_str(&format!("<td>{}</td>", cell(r.scores.get(m).copied())));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    page_end(&mut html);
    html
}

/// Generate the page for one lab run.
pub fn generate_lab_html(report: &LabReport) -> String {
    let metrics = ordered_metrics(report.summary.means.keys().map(String::as_str));
    let mut html = page_start(&format!("mtlab lab run — {}", report.model));

    html.push_str("<header>\n");
    html.push_str("<h1>mtlab lab run</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Engine: <strong>{}</strong> | Model: <strong>{}</strong> | {} items | {} failed | {}</p>\n",
        html_escape(&report.engine),
        html_escape(&report.model),
        report.summary.items,
        report.summary.failed,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n<thead><tr><th>Metric</th><th>Mean</th><th>Items</th></tr></thead>\n<tbody>\n");
    for m in &metrics {
        if let Some(mean) = report.summary.means.get(m) {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{:.3}</td><td>{}</td></tr>\n",
                html_escape(m),
                mean.mean,
                mean.count
            ));
        }
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Results</h2>\n");
    html.push_str("<table class=\"results-table sortable\" id=\"results\">\n<thead><tr>");
    html.push_str("<th>Item</th><th>Source</th><th>MT output</th><th>Reference</th>");
    for m in &metrics {
        html.push_str(&format!("<th>{}</th>", html_escape(m)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for r in &report.results {
        html.push_str(&format!(
            "<tr><td>{}</td><td dir=\"auto\">{}</td><td dir=\"auto\">{}</td><td dir=\"auto\">{}</td>",
            html_escape(&r.item_id),
            html_escape(&r.source),
            html_escape(&r.mt_output),
            html_escape(&r.reference)
        ));
        for m in &metrics {
            html.push_str(&format!("<td>{}</td>", cell(r.scores.get(m))));
        }
        html.push_str("</tr>\n");
    }
    for f in &report.failures {
        html.push_str(&format!(
            "<tr class=\"fail\"><td>{}</td><td colspan=\"{}\">{}</td></tr>\n",
            html_escape(&f.item_id),
            3 + metrics.len(),
            html_escape(&f.error)
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    page_end(&mut html);
    html
}

fn write_file(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Write the class overview to a file.
pub fn write_html_report(overview: &ClassOverview, path: &Path) -> Result<()> {
    write_file(path, &generate_overview_html(overview))
}

/// Write a lab run report to a file.
pub fn write_lab_html(report: &LabReport, path: &Path) -> Result<()> {
    write_file(path, &generate_lab_html(report))
}

/// Horizontal bars for values in `[0, 1]`.
fn generate_bar_chart(bars: &[(String, f64)]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = bars.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (label, score)) in bars.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (score.clamp(0.0, 1.0) * max_width as f64) as usize;

        let color = if *score >= 0.6 {
            "#22c55e"
        } else if *score >= 0.3 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.3}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Naskh Arabic', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: start; }
th { background: var(--border); cursor: pointer; }
.total { font-weight: bold; }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
document.querySelectorAll('table.sortable').forEach(table => {
  table.querySelectorAll('th').forEach((th, col) => {
    th.addEventListener('click', () => sortTable(table, col));
  });
});
function sortTable(table, col) {
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr:not(.total)'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col] ? a.cells[col].textContent : '';
    const vb = b.cells[col] ? b.cells[col].textContent : '';
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  const total = tbody.querySelector('tr.total');
  rows.forEach(r => tbody.appendChild(r));
  if (total) tbody.appendChild(total);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overview::build_overview;
    use mtlab_core::report::{LabFailure, LabResult};
    use mtlab_core::scoring::Scorer;
    use mtlab_core::statistics::compute_summary;
    use std::collections::BTreeMap;

    fn make_lab_report() -> LabReport {
        let results = vec![LabResult {
            item_id: "item-1".into(),
            source: "Please submit <b>now</b>.".into(),
            reference: "يرجى التقديم الآن.".into(),
            mt_output: "يرجى التقديم الآن.".into(),
            model: "gpt-4o-mini".into(),
            scores: Scorer::baseline_only().score("يرجى التقديم الآن.", "يرجى التقديم الآن."),
            latency_ms: 120,
            attempts: 1,
        }];
        let summary = compute_summary(&results, 1);
        LabReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            engine: "openai".into(),
            model: "gpt-4o-mini".into(),
            results,
            failures: vec![LabFailure {
                item_id: "item-2".into(),
                error: "rate limited".into(),
            }],
            summary,
            duration_ms: 1000,
        }
    }

    fn make_overview() -> ClassOverview {
        let rows: Vec<BTreeMap<String, String>> = vec![
            [
                ("student", "sara"),
                ("mode", "pairs"),
                ("item_id", "1"),
                ("post_edit", "<script>alert(1)</script>"),
                ("metric_p1", "0.5"),
                ("metric_p2", "0.25"),
            ],
            [
                ("student", "omar & co"),
                ("mode", "ticket"),
                ("ticket_id", "T1"),
                ("post_edit", "نص"),
                ("metric_p1", "1.0"),
                ("metric_p2", "0.75"),
            ],
        ]
        .iter()
        .map(|cells| {
            cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .collect();
        build_overview(&rows)
    }

    #[test]
    fn lab_html_contains_required_elements() {
        let html = generate_lab_html(&make_lab_report());

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("gpt-4o-mini"));
        assert!(html.contains("item-1"));
        assert!(html.contains("item-2"));
        assert!(html.contains("&lt;b&gt;now&lt;/b&gt;"));
        assert!(!html.contains("<b>now</b>"));
    }

    #[test]
    fn overview_html_escapes_student_text() {
        let html = generate_overview_html(&make_overview());

        assert!(html.contains("omar &amp; co"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("<svg"));
        assert!(html.contains("<th>p2</th>"));
        assert!(html.contains("0.500"));
    }

    #[test]
    fn write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("overview.html");

        write_html_report(&make_overview(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("class overview"));

        let lab_path = dir.path().join("lab.html");
        write_lab_html(&make_lab_report(), &lab_path).unwrap();
        assert!(lab_path.exists());
    }
}
