//! Error types for `att-core`.

use thiserror::Error;

/// Errors raised by subject and timetable mutations.
///
/// Every operation that returns one of these leaves its store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The subject name was empty or whitespace-only.
    #[error("subject name cannot be empty")]
    InvalidName,

    #[error("subject already exists: {0}")]
    DuplicateSubject(String),

    #[error("subject not found: {0}")]
    NotFound(String),

    /// The target percentage was outside 50..=100.
    #[error("target must be between 50 and 100, got {0}")]
    InvalidTarget(i64),

    /// The day is not a weekday name, or not one of the supported days.
    #[error("unknown day: {0}")]
    UnknownDay(String),

    /// A timetable entry referenced a subject that is not registered.
    #[error("cannot schedule unknown subject: {0}")]
    SubjectNotFound(String),

    #[error("{subject} is not scheduled on {day}")]
    NotScheduled { day: String, subject: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
