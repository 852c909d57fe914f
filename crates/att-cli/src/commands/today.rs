//! `att today`: the day's scheduled subjects with their standing.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use att_core::engine;
use att_core::{Day, Subjects, Timetable};
use att_store::Tracker;
use chrono::{Datelike, NaiveDate};

use super::util::status_line;

/// Formats the schedule for `date` against the current subjects.
pub fn format_today(subjects: &Subjects, timetable: &Timetable, date: NaiveDate) -> String {
    let mut output = String::new();
    let day = Day::from(date.weekday());
    writeln!(output, "{}", date.format("%A, %b %-d, %Y")).unwrap();

    let scheduled = timetable.subjects_for(day);
    if scheduled.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No subjects scheduled for {day}.").unwrap();
        return output;
    }

    for name in scheduled {
        writeln!(output).unwrap();
        let Some(record) = subjects.get(name) else {
            // Hand-edited timetables can still name removed subjects.
            writeln!(output, "{name}: not a registered subject").unwrap();
            continue;
        };
        writeln!(output, "{name}: {}", status_line(record)).unwrap();
        match record.outcome_on(date) {
            Some(outcome) => writeln!(output, "  Marked {outcome} today.").unwrap(),
            None => writeln!(output, "  Not marked yet.").unwrap(),
        }
        writeln!(output, "  {}", engine::recommend(record)).unwrap();
    }
    output
}

pub fn run<W: Write>(writer: &mut W, tracker: &Tracker, date: NaiveDate) -> Result<()> {
    let snapshot = tracker.snapshot()?;
    write!(
        writer,
        "{}",
        format_today(&snapshot.subjects, &snapshot.timetable, date)
    )?;
    Ok(())
}
