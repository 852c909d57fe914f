//! Core domain logic for the attendance tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Subjects: the per-subject counters, target and dated history
//! - Timetable: which subjects are taught on which weekday
//! - Engine: percentages, skip budgets and weekly rollups
//!
//! Nothing here performs I/O; persistence lives in `att-store`.

pub mod engine;
mod error;
mod record;
mod subjects;
mod timetable;
mod types;

pub use engine::{Allowance, Recommendation, SkipProjection, Standing, WeeklySummary};
pub use error::{Error, Result};
pub use record::SubjectRecord;
pub use subjects::Subjects;
pub use timetable::Timetable;
pub use types::{Day, Outcome, Target, UnknownOutcome};
