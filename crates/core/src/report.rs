//! Plain-text rendering of the audit and clean summaries.

use crate::audit::AuditReport;
use crate::clean::CleanSummary;
use std::fmt::Write;

const NAME_WIDTH: usize = 30;

fn pct(value: f64) -> String {
    format!("{:.1}%", value)
}

fn total_pct(total: usize) -> &'static str {
    if total == 0 {
        "0%"
    } else {
        "100%"
    }
}

/// Renders rows under a header with columns padded to the widest cell.
/// Columns listed in `right` are right-aligned.
fn render_table(title: &str, headers: &[&str], rows: &[Vec<String>], right: &[usize]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if right.contains(&i) {
                    format!("{:>w$}", c, w = widths[i])
                } else {
                    format!("{:<w$}", c, w = widths[i])
                }
            })
            .collect();
        format!("| {} |", padded.join(" | "))
    };
    let rule = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut out = String::new();
    if !title.is_empty() {
        let _ = writeln!(out, "{}", title);
    }
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{}", line(header_cells.as_slice()));
    let _ = writeln!(out, "{}", rule);
    for row in rows {
        let _ = writeln!(out, "{}", line(row.as_slice()));
    }
    let _ = writeln!(out, "{}", rule);
    out
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub fn render_audit(report: &AuditReport, source: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Compliance Audit Report: {}\n", source);
    if report.total == 0 {
        let _ = writeln!(out, "No rows found in input.\n");
    }

    let rows = vec![
        vec![
            "Total Rows".to_string(),
            report.total.to_string(),
            total_pct(report.total).to_string(),
        ],
        vec![
            "Total Agreement".to_string(),
            report.agreements.to_string(),
            pct(report.percent(report.agreements)),
        ],
        vec![
            "High Confidence Agreement".to_string(),
            report.high_confidence_agreements.to_string(),
            pct(report.percent(report.high_confidence_agreements)),
        ],
        vec![
            "Low Confidence (< 50%)".to_string(),
            report.low_confidence.to_string(),
            pct(report.percent(report.low_confidence)),
        ],
        vec![
            "Danger Zone (High Conf Mismatch)".to_string(),
            report.high_confidence_disagreements.to_string(),
            pct(report.percent(report.high_confidence_disagreements)),
        ],
    ];
    out.push_str(&render_table(
        "Risk Analysis Summary",
        &["Metric", "Count", "Percentage"],
        &rows,
        &[1, 2],
    ));

    if !report.danger_samples.is_empty() {
        let _ = writeln!(out, "\nDANGER ZONE EXAMPLES (High Confidence Mismatches)");
        let rows: Vec<Vec<String>> = report
            .danger_samples
            .iter()
            .map(|r| {
                vec![
                    truncate(&r.name, NAME_WIDTH),
                    r.original.clone(),
                    r.predicted.replace(" and ", " & "),
                    format!("{:.2}", r.confidence),
                ]
            })
            .collect();
        out.push_str(&render_table(
            "",
            &["Name", "Original", "AI Prediction", "Conf"],
            &rows,
            &[3],
        ));
        let omitted = report.omitted_danger_rows();
        if omitted > 0 {
            let _ = writeln!(out, "...and {} more rows.", omitted);
        }
    }
    out
}

pub fn render_clean(summary: &CleanSummary, output: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Audit Complete. Fixes applied to: {}\n", output);
    let rows = vec![
        vec![
            "Total Rows".to_string(),
            summary.total.to_string(),
            total_pct(summary.total).to_string(),
        ],
        vec![
            "Verified (Kept Original)".to_string(),
            summary.verified.to_string(),
            pct(summary.percent(summary.verified)),
        ],
        vec![
            "Low Confidence (Needs Review)".to_string(),
            summary.needs_review.to_string(),
            pct(summary.percent(summary.needs_review)),
        ],
        vec![
            "Auto-Fixed (High Risk Errors)".to_string(),
            summary.auto_fixed.to_string(),
            pct(summary.percent(summary.auto_fixed)),
        ],
    ];
    out.push_str(&render_table(
        "File Processing Summary",
        &["Metric", "Count", "Percentage"],
        &rows,
        &[1, 2],
    ));
    if summary.auto_fixed > 0 {
        let _ = writeln!(
            out,
            "\nWARNING: {} row(s) had their original category overridden (AUTO_FIXED).",
            summary.auto_fixed
        );
    }
    if summary.truncated_rows > 0 {
        let _ = writeln!(out, "{}", truncation_note(summary.truncated_rows));
    }
    out
}

/// Note for rows that had more fields than the header.
pub fn truncation_note(rows: usize) -> String {
    format!(
        "WARNING: {} row(s) had more fields than the header; the extra fields were dropped.",
        rows
    )
}
