//! CLI output formatting.
//!
//! Every command reports what it produced as a short inventory: the series
//! grouped the way the index shows them, followed by the page that was
//! written. Formatting is kept in pure `format_*` functions returning lines,
//! with thin `print_*` wrappers, so output can be tested without capturing
//! stdout.
//!
//! # Output Format
//!
//! ## Index
//!
//! ```text
//! By Title
//!     A
//!         001 alpha [s2]
//!     Z
//!         001 Zeta [s1] (editable)
//! By Author
//!     Ash (ash#0001)
//!         001 Zeta [s1] (editable)
//! Generated index.html (2 series, 2 title groups, 1 author groups)
//! ```
//!
//! ## Series
//!
//! ```text
//! Of Wolves [wolves] (3 parts, 1200 words) → series/wolves.html
//! ```

use crate::edit::EditOutcome;
use crate::index::{IndexMode, build_groups};
use crate::relative_time::plural;
use crate::types::{LoginData, Series, TrimmedSeries};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// ```text
/// 001 Zeta [s1] (editable)
/// ```
fn series_line<S>(index: usize, series: &Series<S>) -> String {
    let mut line = format!("{} {} [{}]", format_index(index), series.title, series.tag);
    if series.can_edit {
        line.push_str(" (editable)");
    }
    line
}

/// Group-by-group listing of both indices, then a summary line.
pub fn format_index_output(series: &[TrimmedSeries], path: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let mut counts = Vec::new();

    for mode in [IndexMode::ByTitle, IndexMode::ByAuthor] {
        let groups = build_groups(series, mode);
        lines.push(mode.tab_label().to_string());
        for group in &groups {
            lines.push(format!("{}{}", indent(1), group.key));
            for (i, s) in group.series.iter().enumerate() {
                lines.push(format!("{}{}", indent(2), series_line(i + 1, s)));
            }
        }
        counts.push(groups.len());
    }

    lines.push(format!(
        "Generated {} ({} series, {} title groups, {} author groups)",
        path.display(),
        series.len(),
        counts[0],
        counts[1]
    ));
    lines
}

pub fn print_index_output(series: &[TrimmedSeries], path: &Path) {
    for line in format_index_output(series, path) {
        println!("{}", line);
    }
}

pub fn format_series_output(series: &Series, path: &Path) -> String {
    format!(
        "{} [{}] ({}, {}) \u{2192} {}",
        series.title,
        series.tag,
        plural(series.snippets.len() as u64, "part"),
        plural(series.wordcount, "word"),
        path.display()
    )
}

pub fn print_series_output(series: &Series, path: &Path) {
    println!("{}", format_series_output(series, path));
}

pub fn format_snippet_output(message_id: u64, path: &Path) -> String {
    format!("Snippet {} \u{2192} {}", message_id, path.display())
}

pub fn print_snippet_output(message_id: u64, path: &Path) {
    println!("{}", format_snippet_output(message_id, path));
}

/// `kit#0007`, `kit#0007 (dev mode)` or `anonymous`.
pub fn format_login(login: &LoginData) -> String {
    let who = match &login.user_data {
        Some(user) => user.tag(),
        None => "anonymous".to_string(),
    };
    if login.dev_mode {
        format!("{who} (dev mode)")
    } else {
        who
    }
}

pub fn print_login(login: &LoginData) {
    println!("{}", format_login(login));
}

pub fn format_edit_outcome(tag: &str, outcome: &EditOutcome) -> String {
    match outcome {
        EditOutcome::Unchanged => format!("{tag}: no changes"),
        EditOutcome::Reload => format!("{tag}: saved, reloading index"),
        EditOutcome::Failed(message) => format!("{tag}: {message}"),
    }
}

pub fn print_edit_outcome(tag: &str, outcome: &EditOutcome) {
    match outcome {
        EditOutcome::Failed(_) => eprintln!("{}", format_edit_outcome(tag, outcome)),
        _ => println!("{}", format_edit_outcome(tag, outcome)),
    }
}

// ============================================================================
// Tests
// ============================================================================
