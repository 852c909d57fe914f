//! Storage layer for the attendance tracker.
//!
//! State lives in two JSON documents inside a data directory:
//! - `data.json`: subject name to `{attended, missed, target, history}`
//! - `timetable.json`: weekday name to an ordered list of subject names
//!
//! Both are loaded wholesale and rewritten wholesale. A missing or malformed
//! file is treated as empty rather than an error; [`Snapshot::malformed`]
//! reports the latter, and the first write over it keeps a `.json.bak` copy.
//!
//! # Concurrency
//!
//! There is no merge strategy: two overlapping read-modify-write cycles would
//! lose one update. Every [`Tracker`] operation therefore holds an exclusive
//! lock on `<data_dir>/.lock` for its whole load/mutate/save cycle. One lock
//! covers both documents, so removing a subject and cascading it out of the
//! timetable is a single atomic step.

mod file;
mod tracker;

use std::path::PathBuf;

use thiserror::Error;

pub use file::{LoadState, Loaded, Staged, StoreFile};
pub use tracker::{ImportReport, Snapshot, Tracker};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A subject or timetable operation was rejected. Nothing was written.
    #[error(transparent)]
    Domain(#[from] att_core::Error),
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to lock {}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// The domain error, when the failure was a rejected operation.
    pub const fn domain(&self) -> Option<&att_core::Error> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }
}
