//! Shared utilities for CLI commands.

use att_core::engine::{self, Standing};
use att_core::SubjectRecord;
use att_store::Snapshot;
use chrono::{Local, NaiveDate};

/// The given date, or today's local date.
pub fn resolve_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Two-decimal rendering shared by every output, so display and export agree.
pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}")
}

/// One-line standing of a subject, e.g. `[ok] 80.00% | target 75%`.
pub fn status_line(record: &SubjectRecord) -> String {
    let target = record.target();
    match engine::standing(record) {
        Standing::NoData => format!("[--] no classes yet | target {target}"),
        Standing::OnTrack => format!(
            "[ok] {}% | target {target}",
            format_percentage(engine::current_percentage(record))
        ),
        Standing::BelowTarget => format!(
            "[low] {}% | target {target}",
            format_percentage(engine::current_percentage(record))
        ),
    }
}

/// One warning per data file that could not be parsed and was read as empty.
pub fn malformed_warnings(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .malformed()
        .into_iter()
        .map(|(name, reason)| {
            format!(
                "warning: {name} was malformed and was treated as empty ({reason}); \
                 the next change keeps a copy as {name}.bak"
            )
        })
        .collect()
}
