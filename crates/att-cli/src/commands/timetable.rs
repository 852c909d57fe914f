//! `att timetable add|remove|show`.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use att_core::{Day, Timetable};
use att_store::Tracker;

pub fn add<W: Write>(writer: &mut W, tracker: &Tracker, day: Day, subject: &str) -> Result<()> {
    if tracker.add_to_day(day, subject)? {
        writeln!(writer, "Scheduled {subject} on {day}.")?;
    } else {
        writeln!(writer, "{subject} is already scheduled on {day}.")?;
    }
    Ok(())
}

pub fn remove<W: Write>(writer: &mut W, tracker: &Tracker, day: Day, subject: &str) -> Result<()> {
    tracker.remove_from_day(day, subject)?;
    writeln!(writer, "Removed {subject} from {day}.")?;
    Ok(())
}

/// One line per supported day, Monday first.
pub fn format_timetable(timetable: &Timetable) -> String {
    let mut output = String::new();
    for (day, subjects) in timetable.iter() {
        if subjects.is_empty() {
            writeln!(output, "{:<10} -", day.name()).unwrap();
        } else {
            writeln!(output, "{:<10} {}", day.name(), subjects.join(", ")).unwrap();
        }
    }
    output
}

pub fn show<W: Write>(writer: &mut W, tracker: &Tracker, json: bool) -> Result<()> {
    let snapshot = tracker.snapshot()?;
    if json {
        let output = serde_json::to_string_pretty(&snapshot.timetable)
            .context("failed to serialize timetable")?;
        writeln!(writer, "{output}")?;
    } else {
        write!(writer, "{}", format_timetable(&snapshot.timetable))?;
    }
    Ok(())
}
