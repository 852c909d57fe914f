//! The subject store: subject name to attendance record.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::SubjectRecord;
use crate::types::{Outcome, Target};

/// All registered subjects, keyed by unique name.
///
/// Iteration is in name order, which keeps exports stable for a given
/// snapshot. Records are only reachable mutably through the operations below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subjects {
    records: BTreeMap<String, SubjectRecord>,
}

impl Subjects {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subject with zero counters and empty history.
    ///
    /// The name is trimmed before validation and storage. Returns the stored name.
    pub fn add_subject(&mut self, name: &str, target: i64) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        if self.records.contains_key(name) {
            return Err(Error::DuplicateSubject(name.to_string()));
        }
        let target = Target::new(target)?;

        self.records
            .insert(name.to_string(), SubjectRecord::new(target));
        tracing::debug!(subject = name, %target, "added subject");
        Ok(name.to_string())
    }

    /// Deletes a subject and returns its final record.
    ///
    /// Callers holding a [`Timetable`](crate::Timetable) must follow up with
    /// [`Timetable::cascade_remove`](crate::Timetable::cascade_remove).
    pub fn remove_subject(&mut self, name: &str) -> Result<SubjectRecord> {
        let record = self
            .records
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        tracing::debug!(subject = name, "removed subject");
        Ok(record)
    }

    /// Records one outcome for `date`.
    ///
    /// Repeating the same outcome for a date changes nothing; recording the
    /// other outcome corrects the earlier mark. Returns whether counters changed.
    pub fn record_outcome(&mut self, name: &str, date: NaiveDate, outcome: Outcome) -> Result<bool> {
        let record = self
            .records
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        let changed = record.record(date, outcome);
        tracing::debug!(subject = name, %date, %outcome, changed, "recorded outcome");
        Ok(changed)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SubjectRecord> {
        self.records.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SubjectRecord)> {
        self.records.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
