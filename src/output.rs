//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every processed file is shown as a header line (positional index plus
//! file name) followed by indented context lines: where it came from, which
//! canvas it landed on, and where the result went.
//!
//! # Output Format
//!
//! ## Batch
//!
//! ```text
//! Processing 3 files
//! 001 beach.jpg
//!     Source: photos/beach.jpg (4032x3024)
//!     Canvas: 1080x1080, coverage 75.0%
//!     Output: photos/beach_insta.jpg
//! 002 beach_insta.jpg
//!     skipped: already an output
//! 003 broken.jpg
//!     failed: Failed to decode photos/broken.jpg: ...
//!
//! Wrote 1, skipped 1, failed 1
//! ```
//!
//! Positions follow completion order, since files finish in parallel.
//!
//! ## Test images
//!
//! ```text
//! Wrote 78 test images to test-images/
//!     test-sm-0600x0750.png
//!     ...
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchReport, FileOutcome, FileResult};
use std::path::{Path, PathBuf};

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
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Batch output
// ============================================================================

/// Format one file's result as display lines.
pub fn format_file_result(position: usize, result: &FileResult) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}",
        format_index(position),
        file_name(&result.input)
    )];
    match &result.outcome {
        FileOutcome::Written(written) => {
            lines.push(format!(
                "{}Source: {} ({})",
                indent(1),
                result.input.display(),
                written.source
            ));
            lines.push(format!(
                "{}Canvas: {}, coverage {:.1}%",
                indent(1),
                written.canvas,
                written.coverage * 100.0
            ));
            lines.push(format!("{}Output: {}", indent(1), written.output.display()));
        }
        FileOutcome::Skipped => {
            lines.push(format!("{}skipped: already an output", indent(1)));
        }
        FileOutcome::Failed(message) => {
            lines.push(format!("{}failed: {}", indent(1), message));
        }
    }
    lines
}

/// Format a progress event. `position` is the count of files finished so
/// far, including this one; it is ignored for [`BatchEvent::Started`].
pub fn format_batch_event(event: &BatchEvent, position: usize) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => {
            let noun = if *total == 1 { "file" } else { "files" };
            vec![format!("Processing {} {}", total, noun)]
        }
        BatchEvent::FileFinished(result) => format_file_result(position, result),
    }
}

/// One-line totals.
pub fn format_batch_summary(report: &BatchReport) -> String {
    format!(
        "Wrote {}, skipped {}, failed {}",
        report.written(),
        report.skipped(),
        report.failed()
    )
}

/// Print batch totals to stdout.
pub fn print_batch_summary(report: &BatchReport) {
    println!();
    println!("{}", format_batch_summary(report));
}

// ============================================================================
// Test images
// ============================================================================

/// Format the list of generated test images.
pub fn format_test_images(dir: &Path, written: &[PathBuf]) -> Vec<String> {
    let mut lines = vec![format!(
        "Wrote {} test images to {}/",
        written.len(),
        dir.display()
    )];
    lines.extend(
        written
            .iter()
            .map(|path| format!("{}{}", indent(1), file_name(path))),
    );
    lines
}

/// Print the list of generated test images to stdout.
pub fn print_test_images(dir: &Path, written: &[PathBuf]) {
    for line in format_test_images(dir, written) {
        println!("{}", line);
    }
}
