//! Report command for per-subject attendance.
//!
//! This module implements `att report`: overall standing, the weekly rollup
//! for the week containing the reference date, and what skipping the next
//! class would do, in human-readable or JSON form.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use att_core::engine::{self, SkipProjection, Standing, WeeklySummary};
use att_core::Subjects;
use att_store::Tracker;
use chrono::NaiveDate;
use serde::Serialize;

use super::subject::SubjectSummary;
use super::util::{format_percentage, status_line};

/// One subject's row in the report.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectReport {
    #[serde(flatten)]
    pub summary: SubjectSummary,
    pub week: WeeklySummary,
    pub skip_next: SkipProjection,
    pub advice: String,
}

/// Totals across every subject.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReportTotals {
    pub attended: u64,
    pub missed: u64,
    pub percentage: f64,
    pub below_target: usize,
}

/// Computed report data.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub date: NaiveDate,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub subjects: Vec<SubjectReport>,
    pub totals: ReportTotals,
}

// ========== Report Generation ==========

/// Builds the report for `date` from the current subjects.
pub fn generate_report_data(subjects: &Subjects, date: NaiveDate) -> ReportData {
    let (week_start, week_end) = engine::week_bounds(date);

    let reports: Vec<SubjectReport> = subjects
        .iter()
        .map(|(name, record)| SubjectReport {
            summary: SubjectSummary::new(name, record),
            week: engine::weekly_summary(record, date),
            skip_next: engine::simulate_skip_next(record),
            advice: engine::recommend(record).to_string(),
        })
        .collect();

    let attended: u64 = reports.iter().map(|r| u64::from(r.summary.attended)).sum();
    let missed: u64 = reports.iter().map(|r| u64::from(r.summary.missed)).sum();
    let below_target = reports
        .iter()
        .filter(|r| r.summary.standing == Standing::BelowTarget)
        .count();

    ReportData {
        date,
        week_start,
        week_end,
        subjects: reports,
        totals: ReportTotals {
            attended,
            missed,
            percentage: engine::percentage(attended, attended + missed),
            below_target,
        },
    }
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData, subjects: &Subjects) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "ATTENDANCE REPORT: Week of {}",
        data.week_start.format("%b %-d, %Y")
    )
    .unwrap();

    if data.subjects.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No subjects yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'att subject add <name>' to start tracking.").unwrap();
        return output;
    }

    writeln!(output).unwrap();
    writeln!(output, "BY SUBJECT").unwrap();
    writeln!(output, "──────────").unwrap();

    for report in &data.subjects {
        let summary = &report.summary;
        let Some(record) = subjects.get(&summary.name) else {
            continue;
        };
        writeln!(output).unwrap();
        writeln!(output, "{}", summary.name).unwrap();
        writeln!(
            output,
            "  Overall:    {} ({} of {} classes)",
            status_line(record),
            summary.attended,
            record.total()
        )
        .unwrap();

        if report.week.total == 0 {
            writeln!(output, "  This week:  no classes recorded").unwrap();
        } else {
            writeln!(
                output,
                "  This week:  {} of {} classes ({}%)",
                report.week.attended,
                report.week.total,
                format_percentage(report.week.percentage)
            )
            .unwrap();
        }

        let verdict = if report.skip_next.would_stay_on_track {
            "still on track"
        } else {
            "below target"
        };
        writeln!(
            output,
            "  Skip next:  {}% ({verdict})",
            format_percentage(report.skip_next.projected_percentage)
        )
        .unwrap();
        writeln!(output, "  {}", report.advice).unwrap();
    }

    let totals = &data.totals;
    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Subjects:      {}", data.subjects.len()).unwrap();
    writeln!(
        output,
        "Classes:       {} ({} attended, {} missed)",
        totals.attended + totals.missed,
        totals.attended,
        totals.missed
    )
    .unwrap();
    writeln!(output, "Overall:       {}%", format_percentage(totals.percentage)).unwrap();
    writeln!(output, "Below target:  {}", totals.below_target).unwrap();

    output
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W: Write>(writer: &mut W, tracker: &Tracker, date: NaiveDate, json: bool) -> Result<()> {
    let snapshot = tracker.snapshot()?;
    let data = generate_report_data(&snapshot.subjects, date);

    if json {
        writeln!(writer, "{}", format_report_json(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data, &snapshot.subjects))?;
    }
    Ok(())
}
