//! Plain-text rendering of sessions for the terminal

use std::fmt::Write;

use logscope_logs::{LevelCounts, LogView, page_count};
use logscope_types::{LogEntry, LogLevel, Module, Schema};

/// One line per entry: time, level, service, source/module and message
pub fn format_entry(entry: &LogEntry) -> String {
    let mut line = format!(
        "{} {} [{}]",
        entry.timestamp,
        entry.level.short(),
        entry.service
    );
    if let Some(source) = &entry.source {
        let _ = write!(line, " {}", source);
    }
    if let Some(module) = &entry.module {
        let _ = write!(line, " {}", module);
    }
    if let Some(operator) = &entry.operator {
        let _ = write!(line, " ({})", operator);
    }
    let _ = write!(line, ": {}", entry.message);
    line
}

/// Pretty JSON of an entry's details, indented under its line
pub fn format_details(entry: &LogEntry) -> Option<String> {
    let details = entry.details.as_ref()?;
    let pretty = serde_json::to_string_pretty(details).ok()?;
    Some(
        pretty
            .lines()
            .map(|l| format!("    {}", l))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

pub fn format_level_counts(counts: &LevelCounts) -> String {
    LogLevel::ALL
        .iter()
        .map(|level| format!("{} {}", level.short(), counts.get(*level)))
        .collect::<Vec<_>>()
        .join("  ")
}

/// `page x/y, n of m entries`
pub fn format_summary(view: &LogView) -> String {
    let pagination = view.pagination();
    format!(
        "page {}/{}, {} of {} entries",
        pagination.current,
        page_count(pagination.total, pagination.page_size).max(1),
        pagination.total,
        view.all().len()
    )
}

pub fn format_schema(schema: &Schema, selected: bool) -> String {
    let marker = if selected { "*" } else { " " };
    format!("{} {}\t{}", marker, schema.id, schema.name)
}

pub fn format_module(module: &Module, selected: bool) -> String {
    let marker = if selected { "*" } else { " " };
    format!("{} {}\t{}", marker, module.id, module.name)
}
