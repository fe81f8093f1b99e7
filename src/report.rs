//! Rendering of run results into the CLI report.
//!
//! Pure formatting: [`format_report`] turns a [`RunReport`] into display
//! lines and a thin `print_` wrapper writes them to stdout, so tests can
//! assert on report content without capturing output.
//!
//! Long lists are previewed, not dumped: missing/extra template names cap at
//! five, mismatches at three, with an overflow count — a language that
//! drifted badly produces a readable summary instead of a wall of names.
//! The final line is always an unambiguous verdict.

use crate::reconcile::ReconciliationResult;
use crate::run::{LanguageOutcome, RunReport};
use serde_json::Value;

/// How many missing/extra names to show per language.
const NAME_PREVIEW: usize = 5;
/// How many structural mismatches to show per language.
const MISMATCH_PREVIEW: usize = 3;
/// How many applied fixes to show per language.
const CHANGE_PREVIEW: usize = 5;

/// Render the full report as display lines.
pub fn format_report(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Reference".to_string());
    lines.push(format!(
        "    {} ({} templates)",
        file_name(report),
        report.reference_template_count
    ));
    for warning in &report.reference_warnings {
        lines.push(format!("    warning: {warning}"));
    }

    for outcome in &report.languages {
        lines.push(String::new());
        lines.extend(format_language(outcome));
    }

    lines.push(String::new());
    lines.extend(format_verdict(report));
    lines
}

/// Print the report to stdout.
pub fn print_report(report: &RunReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

fn file_name(report: &RunReport) -> String {
    report
        .reference_file
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.reference_file.display().to_string())
}

fn format_language(outcome: &LanguageOutcome) -> Vec<String> {
    let mut lines = Vec::new();
    let file = outcome
        .file
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| outcome.file.display().to_string());
    lines.push(format!("{} ({})", outcome.language, file));

    if let Some(error) = &outcome.load_error {
        lines.push(format!("    load error: {error}"));
        return lines;
    }

    for warning in &outcome.warnings {
        lines.push(format!("    warning: {warning}"));
    }

    for (i, change) in outcome.changes.iter().enumerate() {
        if i == CHANGE_PREVIEW {
            lines.push(format!(
                "    fixed: ... and {} more",
                outcome.changes.len() - CHANGE_PREVIEW
            ));
            break;
        }
        lines.push(format!("    fixed: {change}"));
    }

    if let Some(error) = &outcome.write_error {
        lines.push(format!("    write error: {error}"));
    }

    if let Some(result) = &outcome.result {
        lines.extend(format_result(result));
        if result.is_clean() && outcome.write_error.is_none() {
            lines.push("    consistent".to_string());
        }
    }

    lines
}

fn format_result(result: &ReconciliationResult) -> Vec<String> {
    let mut lines = Vec::new();

    if !result.missing.is_empty() {
        lines.push(format!(
            "    missing ({}): {}",
            result.missing.len(),
            preview_names(&result.missing)
        ));
    }
    if !result.extra.is_empty() {
        lines.push(format!(
            "    extra ({}): {}",
            result.extra.len(),
            preview_names(&result.extra)
        ));
    }

    for (i, mismatch) in result.mismatches.iter().enumerate() {
        if i == MISMATCH_PREVIEW {
            lines.push(format!(
                "    ... and {} more mismatches",
                result.mismatches.len() - MISMATCH_PREVIEW
            ));
            break;
        }
        lines.push(format!(
            "    mismatch: {}.{}: {} (should be {})",
            mismatch.template,
            mismatch.field,
            render_value(&mismatch.current_value),
            render_value(&mismatch.reference_value)
        ));
    }

    if let Some(counts) = result.category_counts {
        lines.push(format!(
            "    categories: {} (should be {})",
            counts.actual, counts.expected
        ));
    }

    lines
}

fn format_verdict(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();

    if report.fix_mode {
        let modified = report.modified_files();
        if !modified.is_empty() {
            let names: Vec<String> = modified
                .iter()
                .map(|p| {
                    p.file_name()
                        .map(|f| f.to_string_lossy().into_owned())
                        .unwrap_or_else(|| p.display().to_string())
                })
                .collect();
            lines.push(format!(
                "Fixed {} file(s): {}",
                names.len(),
                names.join(", ")
            ));
        }
    }

    if report.is_clean() {
        lines.push("All languages consistent with the reference.".to_string());
    } else {
        let dirty = report.languages.iter().filter(|l| !l.is_clean()).count();
        lines.push(format!(
            "{} of {} languages inconsistent.",
            dirty,
            report.languages.len()
        ));
    }

    lines
}

/// Comma-joined name preview with an overflow marker.
fn preview_names(names: &[String]) -> String {
    let shown: Vec<&str> = names
        .iter()
        .take(NAME_PREVIEW)
        .map(String::as_str)
        .collect();
    if names.len() > NAME_PREVIEW {
        format!(
            "{} ... and {} more",
            shown.join(", "),
            names.len() - NAME_PREVIEW
        )
    } else {
        shown.join(", ")
    }
}

/// Compact JSON rendering for mismatch values; absent fields show as null.
fn render_value(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}
