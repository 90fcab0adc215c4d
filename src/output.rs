//! CLI output formatting for all pipeline stages.
//!
//! Output is information-centric: each stage leads with what happened to the
//! site (partials forwarded, bytes saved, pages rendered) and shows filesystem
//! paths as secondary context.
//!
//! ```text
//! Style indexes
//!     src/assets/styles/module: 12 partials
//!     src/assets/styles/page: 5 partials (unchanged)
//!     src/assets/styles/plugins: skipped (missing)
//!
//! Images
//!     34 optimized, 2 kept, 0 failed
//!     saved 1.2 MB
//!
//! Pages
//!     /index.html
//!     /service/index.html
//! Rendered 2 pages
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects. Warnings and per-file
//! errors go to stderr so piped output stays clean.

use crate::indexes::IndexOutcome;
use crate::process::BuildSummary;
use crate::recompress::RecompressSummary;
use std::path::Path;

/// Format a byte count with a binary-ish human unit, one decimal.
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

// ============================================================================
// Stage 1: Style indexes
// ============================================================================

pub fn format_index_output(outcomes: &[IndexOutcome]) -> Vec<String> {
    let mut lines = vec!["Style indexes".to_string()];
    for outcome in outcomes {
        let line = if outcome.skipped {
            format!("    {}: skipped (missing)", outcome.dir)
        } else if outcome.written {
            format!("    {}: {} partials", outcome.dir, outcome.forwarded)
        } else {
            format!(
                "    {}: {} partials (unchanged)",
                outcome.dir, outcome.forwarded
            )
        };
        lines.push(line);
    }
    lines
}

pub fn print_index_output(outcomes: &[IndexOutcome]) {
    for line in format_index_output(outcomes) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Images
// ============================================================================

pub fn format_image_output(summary: &BuildSummary) -> Vec<String> {
    let mut lines = vec!["Images".to_string()];
    for dir in &summary.skipped_dirs {
        lines.push(format!("    {dir}: skipped (missing)"));
    }
    lines.push(format!(
        "    {} optimized, {} failed",
        summary.processed(),
        summary.failed()
    ));
    lines.push(format!("    saved {}", format_bytes(summary.total_saved())));
    lines
}

pub fn print_image_output(summary: &BuildSummary) {
    for line in format_image_output(summary) {
        println!("{}", line);
    }
    for file in &summary.files {
        if let Some(error) = &file.error {
            print_file_error(&file.path, error);
        }
    }
}

// ============================================================================
// Recompress
// ============================================================================

pub fn format_recompress_output(summary: &RecompressSummary) -> Vec<String> {
    let mut lines = vec!["Recompress".to_string()];
    for dir in &summary.skipped_dirs {
        lines.push(format!("    {dir}: skipped (missing)"));
    }
    lines.push(format!(
        "    {} shrunk, {} already optimal, {} failed",
        summary.shrunk(),
        summary.kept(),
        summary.failed()
    ));
    lines.push(format!("    saved {}", format_bytes(summary.total_saved())));
    lines
}

pub fn print_recompress_output(summary: &RecompressSummary) {
    for line in format_recompress_output(summary) {
        println!("{}", line);
    }
    for file in &summary.files {
        if let Some(error) = &file.error {
            print_file_error(&file.path, error);
        }
    }
}

// ============================================================================
// Stage 3: Pages
// ============================================================================

pub fn format_page_output(pages: &[String]) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for page in pages {
        lines.push(format!("    {page}"));
    }
    lines.push(format!("Rendered {} pages", pages.len()));
    lines
}

pub fn print_page_output(pages: &[String]) {
    for line in format_page_output(pages) {
        println!("{}", line);
    }
}

// ============================================================================
// Stages 4-5: CSS and asset hashing
// ============================================================================

pub fn format_css_output(file: &str, before: u64, after: u64) -> String {
    format!(
        "CSS {file}: {} \u{2192} {}",
        format_bytes(before),
        format_bytes(after)
    )
}

pub fn print_css_output(file: &str, before: u64, after: u64) {
    println!("{}", format_css_output(file, before, after));
}

pub fn format_hash_output(renamed: usize) -> String {
    format!("Hashed {renamed} assets")
}

pub fn print_hash_output(renamed: usize) {
    println!("{}", format_hash_output(renamed));
}

// ============================================================================
// Watch
// ============================================================================

pub fn print_watch_started(dirs: &[std::path::PathBuf], initial_updates: usize) {
    let list: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
    println!(
        "Watching {} (initial scan wrote siblings for {} files)",
        list.join(", "),
        initial_updates
    );
}

pub fn print_watch_written(source: &Path, written: &[&str]) {
    println!("    {} \u{2192} {}", source.display(), written.join(", "));
}

// ============================================================================
// Diagnostics
// ============================================================================

pub fn print_warning(message: &str) {
    eprintln!("warning: {message}");
}

pub fn print_file_error(path: &Path, message: &str) {
    eprintln!("error: {}: {message}", path.display());
}
