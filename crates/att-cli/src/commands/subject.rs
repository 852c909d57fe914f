//! `att subject add|remove|list`.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use att_core::engine::{self, Allowance, Standing};
use att_core::{SubjectRecord, Subjects};
use att_store::Tracker;
use serde::Serialize;

use super::util::{format_percentage, status_line};

/// One subject with its derived figures, as listed and reported.
///
/// `can_skip` and `must_attend` are always filled from the engine; for a
/// subject with no classes yet `standing` is `no_data` and the counts are
/// not advice.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectSummary {
    pub name: String,
    pub attended: u32,
    pub missed: u32,
    pub target: u8,
    pub percentage: f64,
    pub standing: Standing,
    pub can_skip: Allowance,
    pub must_attend: Allowance,
}

impl SubjectSummary {
    pub fn new(name: &str, record: &SubjectRecord) -> Self {
        Self {
            name: name.to_string(),
            attended: record.attended(),
            missed: record.missed(),
            target: record.target().get(),
            percentage: engine::current_percentage(record),
            standing: engine::standing(record),
            can_skip: engine::can_skip_count(record),
            must_attend: engine::must_attend_count(record),
        }
    }
}

/// Summaries for every subject, in name order.
pub fn summarize(subjects: &Subjects) -> Vec<SubjectSummary> {
    subjects
        .iter()
        .map(|(name, record)| SubjectSummary::new(name, record))
        .collect()
}

pub fn add<W: Write>(writer: &mut W, tracker: &Tracker, name: &str, target: i64) -> Result<()> {
    let name = tracker.add_subject(name, target)?;
    writeln!(writer, "Added subject '{name}' with target {target}%.")?;
    Ok(())
}

pub fn remove<W: Write>(writer: &mut W, tracker: &Tracker, name: &str) -> Result<()> {
    let unscheduled = tracker.remove_subject(name)?;
    writeln!(writer, "Removed subject '{name}'.")?;
    if unscheduled > 0 {
        writeln!(writer, "Also removed it from {unscheduled} day(s) of the timetable.")?;
    }
    Ok(())
}

/// Formats the subject table.
pub fn format_list(subjects: &Subjects) -> String {
    let mut output = String::new();
    if subjects.is_empty() {
        writeln!(output, "No subjects yet. Add one with 'att subject add <name>'.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<20}{:>9}{:>7}{:>11}{:>7}",
        "SUBJECT", "ATTENDED", "MISSED", "ATTENDANCE", "TARGET"
    )
    .unwrap();
    for (name, record) in subjects.iter() {
        writeln!(
            output,
            "{name:<20}{:>9}{:>7}{:>11}{:>7}",
            record.attended(),
            record.missed(),
            format!("{}%", format_percentage(engine::current_percentage(record))),
            record.target().to_string(),
        )
        .unwrap();
    }
    output
}

pub fn list<W: Write>(writer: &mut W, tracker: &Tracker, json: bool) -> Result<()> {
    let snapshot = tracker.snapshot()?;
    if json {
        let summaries = summarize(&snapshot.subjects);
        let output =
            serde_json::to_string_pretty(&summaries).context("failed to serialize subjects")?;
        writeln!(writer, "{output}")?;
    } else {
        write!(writer, "{}", format_list(&snapshot.subjects))?;
    }
    Ok(())
}

/// Status and advice lines for one subject, used after marking.
pub fn describe<W: Write>(writer: &mut W, name: &str, record: &SubjectRecord) -> Result<()> {
    writeln!(writer, "{name}: {}", status_line(record))?;
    writeln!(writer, "  {}", engine::recommend(record))?;
    Ok(())
}
