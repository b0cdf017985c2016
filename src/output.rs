//! CLI output formatting for generation and rotation runs.
//!
//! Each run has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure —
//! no I/O, no side effects. Diagnostics (why a font was skipped, etc.) go to
//! the `log` facade instead; these lines are the user-facing report.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! stoics.csv
//!     001 stoics_quote_001.png (Pacifico, 64px, 3 lines)
//!     line 4: skipped: Malformed record: quote field is empty
//!     002 stoics_quote_002.png (Knewave, 88px, 2 lines)
//!
//! Generated 2 images, skipped 1 → output
//! ```
//!
//! ## Rotate
//!
//! ```text
//! Rotated stoics_quote_001.png
//! Failed  broken.png: Unreadable image ...
//!
//! Rotated 1 image, 1 error
//! ```

use crate::generate::{BatchSummary, CsvReport, Generated, ItemOutcome};
use crate::rotate::{RotateOutcome, RotateReport};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// One generated image: file name plus the layout that was chosen.
pub fn generated_line(generated: &Generated) -> String {
    format!(
        "{} ({}, {}px, {})",
        file_name(&generated.path),
        generated.font,
        generated.layout.font_size,
        plural(generated.layout.lines.len(), "line")
    )
}

/// Format one CSV file's results.
pub fn format_csv_report(report: &CsvReport) -> Vec<String> {
    let mut lines = vec![file_name(&report.source)];
    let mut position = 0;
    for item in &report.items {
        match item {
            ItemOutcome::Generated { generated, .. } => {
                position += 1;
                lines.push(format!(
                    "{}{} {}",
                    indent(1),
                    format_index(position),
                    generated_line(generated)
                ));
            }
            ItemOutcome::Skipped { line, error } => {
                lines.push(format!("{}line {line}: skipped: {error}", indent(1)));
            }
        }
    }
    lines
}

/// Format a whole folder run: every file report followed by the totals.
pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    let mut lines = Vec::new();
    for report in &summary.reports {
        lines.extend(format_csv_report(report));
    }
    for failure in &summary.failed_files {
        lines.push(format!("Failed: {failure}"));
    }
    if summary.reports.is_empty() && summary.failed_files.is_empty() {
        lines.push("No CSV files found".to_string());
    }
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, skipped {} → {}",
        plural(summary.generated(), "image"),
        summary.skipped(),
        summary.output_dir.display()
    ));
    lines
}

/// Format the result of a rotation pass.
pub fn format_rotate_report(report: &RotateReport, dir: &Path) -> Vec<String> {
    if report.outcomes.is_empty() {
        return vec![format!("No images found in {}", dir.display())];
    }
    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .map(|outcome| match outcome {
            RotateOutcome::Rotated(path) => format!("Rotated {}", file_name(path)),
            RotateOutcome::Failed(e) => format!("Failed  {e}"),
        })
        .collect();
    lines.push(String::new());
    lines.push(format!(
        "Rotated {}, {}",
        plural(report.rotated(), "image"),
        plural(report.failed(), "error")
    ));
    lines
}

pub fn print_csv_report(report: &CsvReport) {
    for line in format_csv_report(report) {
        println!("{}", line);
    }
}

pub fn print_batch_summary(summary: &BatchSummary) {
    for line in format_batch_summary(summary) {
        println!("{}", line);
    }
}

pub fn print_rotate_report(report: &RotateReport, dir: &Path) {
    for line in format_rotate_report(report, dir) {
        println!("{}", line);
    }
}

pub fn print_generated(generated: &Generated) {
    println!("Generated {}", generated_line(generated));
    println!("{}{}", indent(1), generated.path.display());
}
