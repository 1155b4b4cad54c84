//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! ## Sync
//!
//! ```text
//! authors: 2 created, 0 deleted, 1 unchanged
//! categories: 1 created, 0 deleted, 0 unchanged
//! articles: 3 created, 1 deleted, 2 unchanged, 1 failed
//! trending: 0 created, 0 deleted, 4 unchanged
//!
//! Failures
//!     articles/bad [reference]: unresolved author reference: no author matches 'Nobody'
//!
//! Generated 18 pages, removed 1 orphaned page
//! ```

use crate::config::SiteConfig;
use crate::store::StoreCounts;
use crate::sync::{KindStats, RunReport};

/// Format a full sync run: per-kind counts, failures, page totals.
pub fn format_run_report(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (kind, stats) in &report.kinds {
        lines.push(format!("{}: {}", kind.label(), format_kind_stats(stats)));
    }

    if !report.failures.is_empty() {
        lines.push(String::new());
        lines.push("Failures".to_string());
        for failure in &report.failures {
            lines.push(format!(
                "    {}/{} [{}]: {}",
                failure.kind.label(),
                failure.slug,
                failure.failure.label(),
                failure.message
            ));
        }
    }

    lines.push(String::new());
    let orphans = match report.orphans_removed {
        0 => String::new(),
        1 => ", removed 1 orphaned page".to_string(),
        n => format!(", removed {} orphaned pages", n),
    };
    lines.push(format!(
        "Generated {} pages{}",
        report.pages_written, orphans
    ));

    lines
}

fn format_kind_stats(stats: &KindStats) -> String {
    let mut parts = vec![
        format!("{} created", stats.created),
        format!("{} deleted", stats.deleted),
        format!("{} unchanged", stats.unchanged),
    ];
    if stats.failed > 0 {
        parts.push(format!("{} failed", stats.failed));
    }
    parts.join(", ")
}

/// Format per-kind record counts for the `stats` command.
pub fn format_stats(counts: &StoreCounts) -> Vec<String> {
    vec![
        format!("authors:    {}", counts.authors),
        format!("categories: {}", counts.categories),
        format!("articles:   {}", counts.articles),
        format!("trending:   {}", counts.topics),
    ]
}

/// Format environment diagnostics for the `status` command.
pub fn format_status(
    config: &SiteConfig,
    tables: &[String],
    foreign_keys: bool,
) -> Vec<String> {
    let mut lines = vec![
        format!("content root: {}", config.content_root),
        format!("output root:  {}", config.output_root),
        format!("store:        {}", config.db_path),
        String::new(),
        format!(
            "foreign keys: {}",
            if foreign_keys { "on" } else { "off" }
        ),
        "tables".to_string(),
    ];
    for table in tables {
        lines.push(format!("    {}", table));
    }
    lines
}

/// Print a sync run report to stdout.
pub fn print_run_report(report: &RunReport) {
    for line in format_run_report(report) {
        println!("{}", line);
    }
}

/// Print store record counts to stdout.
pub fn print_stats(counts: &StoreCounts) {
    for line in format_stats(counts) {
        println!("{}", line);
    }
}

/// Print environment diagnostics to stdout.
pub fn print_status(config: &SiteConfig, tables: &[String], foreign_keys: bool) {
    for line in format_status(config, tables, foreign_keys) {
        println!("{}", line);
    }
}
