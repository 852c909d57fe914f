//! `att mark`: record one day's outcome for a subject.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::Outcome;
use att_store::Tracker;
use chrono::NaiveDate;

use super::subject::describe;

pub fn run<W: Write>(
    writer: &mut W,
    tracker: &Tracker,
    subject: &str,
    outcome: Outcome,
    date: NaiveDate,
) -> Result<()> {
    let changed = tracker.record_outcome(subject, date, outcome)?;
    if changed {
        writeln!(writer, "Marked {subject} as {outcome} on {date}.")?;
    } else {
        writeln!(writer, "{subject} was already marked {outcome} on {date}.")?;
    }

    let snapshot = tracker.snapshot()?;
    let record = snapshot
        .subjects
        .get(subject)
        .with_context(|| format!("subject '{subject}' disappeared after marking"))?;
    describe(writer, subject, record)
}
