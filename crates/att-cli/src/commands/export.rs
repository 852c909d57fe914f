//! Implementation of the `att export` command.
//!
//! Writes one CSV row per subject, in name order, with the same figures the
//! `report` command shows.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::Subjects;
use att_core::engine;
use att_store::Tracker;

use super::util::format_percentage;

const HEADER: [&str; 7] = [
    "Subject",
    "Target (%)",
    "Attended",
    "Missed",
    "Attendance (%)",
    "Can Skip",
    "Must Attend",
];

/// Writes the CSV export of `subjects` to `writer`.
///
/// Columns carry the raw engine figures. A subject with no recorded classes
/// sits at 0% and so reports `Must Attend` as 1 (`all` at a 100% target),
/// even though the `today` and `report` advice for it reads "Not enough data
/// for prediction."; the `standing` field of the JSON listings tells the two
/// apart.
pub fn write_csv<W: Write>(writer: W, subjects: &Subjects) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER).context("failed to write CSV header")?;

    for (name, record) in subjects.iter() {
        csv.write_record([
            name.to_string(),
            record.target().get().to_string(),
            record.attended().to_string(),
            record.missed().to_string(),
            format_percentage(engine::current_percentage(record)),
            engine::can_skip_count(record).to_string(),
            engine::must_attend_count(record).to_string(),
        ])
        .with_context(|| format!("failed to write CSV row for '{name}'"))?;
    }

    csv.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Runs the export command.
pub fn run<W: Write>(writer: W, tracker: &Tracker) -> Result<()> {
    let snapshot = tracker.snapshot()?;
    write_csv(writer, &snapshot.subjects)
}

#[cfg(test)]
mod tests {
    use super::*;

    use att_core::{Day, Outcome};
    use insta::assert_snapshot;

    #[test]
    fn test_write_csv() {
        let mut subjects = Subjects::new();
        subjects.add_subject("Math", 75).unwrap();
        subjects.add_subject("Data Structures, Lab", 100).unwrap();
        subjects.add_subject("Physics", 80).unwrap();
        for (day, outcome) in [
            ("2025-03-03", Outcome::Attended),
            ("2025-03-04", Outcome::Attended),
            ("2025-03-05", Outcome::Missed),
        ] {
            subjects
                .record_outcome("Math", day.parse().unwrap(), outcome)
                .unwrap();
        }

        let mut out = Vec::new();
        write_csv(&mut out, &subjects).unwrap();
        assert_snapshot!(String::from_utf8(out).unwrap(), @r#"
        Subject,Target (%),Attended,Missed,Attendance (%),Can Skip,Must Attend
        "Data Structures, Lab",100,0,0,0.00,0,all
        Math,75,2,1,66.67,0,2
        Physics,80,0,0,0.00,0,1
        "#);
    }

    #[test]
    fn test_unmarked_subject_row_uses_engine_counts() {
        let mut subjects = Subjects::new();
        subjects.add_subject("Art", 60).unwrap();
        let record = subjects.get("Art").unwrap();
        assert_eq!(
            engine::recommend(record).to_string(),
            "Not enough data for prediction."
        );

        let mut out = Vec::new();
        write_csv(&mut out, &subjects).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert_eq!(csv.lines().nth(1), Some("Art,60,0,0,0.00,0,1"));
    }

    #[test]
    fn test_run_with_no_subjects_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = Tracker::open(dir.path(), &Day::TEACHING_WEEK).unwrap();
        let mut out = Vec::new();
        run(&mut out, &tracker).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Subject,Target (%),Attended,Missed,Attendance (%),Can Skip,Must Attend\n"
        );
    }
}
