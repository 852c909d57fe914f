//! Command-line argument definitions.

use std::path::PathBuf;

use att_core::{Day, Outcome};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::commands::ocr::OcrArgs;

/// Attendance tracker.
///
/// Records daily attendance per subject and tells you how many classes you
/// can still skip, or must attend, to stay at your target percentage.
#[derive(Debug, Parser)]
#[command(name = "att", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage subjects.
    #[command(subcommand)]
    Subject(SubjectAction),

    /// Mark attendance for a subject.
    ///
    /// Marking the same day again with the other outcome corrects it.
    Mark {
        /// Subject name.
        subject: String,

        /// present (attended) or absent (missed).
        outcome: Outcome,

        /// Date to mark (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show today's scheduled subjects with their status.
    Today {
        /// Date to show (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Edit or show the weekly timetable.
    #[command(subcommand)]
    Timetable(TimetableAction),

    /// Per-subject report with weekly summary and skip projection.
    Report {
        /// Reference date for the weekly summary (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export attendance as CSV.
    Export {
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Read a timetable from a photo using OCR.
    Ocr(OcrArgs),
}

/// Subject subcommands.
#[derive(Debug, Subcommand)]
pub enum SubjectAction {
    /// Register a new subject.
    Add {
        /// Subject name.
        name: String,

        /// Minimum attendance percentage (50-100). Defaults to the configured target.
        #[arg(long)]
        target: Option<i64>,
    },

    /// Remove a subject and unschedule it from every day.
    Remove {
        /// Subject name.
        name: String,
    },

    /// List subjects with their attendance.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Timetable subcommands.
#[derive(Debug, Subcommand)]
pub enum TimetableAction {
    /// Schedule a subject on a day.
    Add {
        /// Weekday (e.g. Monday).
        day: Day,

        /// Subject name; must already be registered.
        subject: String,
    },

    /// Unschedule a subject from a day.
    Remove {
        /// Weekday (e.g. Monday).
        day: Day,

        /// Subject name.
        subject: String,
    },

    /// Show the weekly timetable.
    Show {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
