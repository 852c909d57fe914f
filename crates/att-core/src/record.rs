//! Per-subject attendance record.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Outcome, Target};

/// Attendance counters, target and per-day history for one subject.
///
/// The counters are authoritative. History holds at most one outcome per date
/// and is kept in step with the counters by [`SubjectRecord::record`]; files
/// written before history was tracked may carry counts without history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    attended: u32,
    missed: u32,
    target: Target,
    #[serde(default, deserialize_with = "deserialize_history")]
    history: BTreeMap<NaiveDate, Outcome>,
}

impl SubjectRecord {
    /// A fresh record with zero counters and empty history.
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// A record with the given counters and no history.
    #[must_use]
    pub fn with_counts(attended: u32, missed: u32, target: Target) -> Self {
        Self {
            attended,
            missed,
            target,
            history: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn attended(&self) -> u32 {
        self.attended
    }

    #[must_use]
    pub const fn missed(&self) -> u32 {
        self.missed
    }

    /// Total conducted classes.
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.attended) + u64::from(self.missed)
    }

    #[must_use]
    pub const fn target(&self) -> Target {
        self.target
    }

    #[must_use]
    pub const fn history(&self) -> &BTreeMap<NaiveDate, Outcome> {
        &self.history
    }

    /// Outcome recorded for `date`, if any.
    #[must_use]
    pub fn outcome_on(&self, date: NaiveDate) -> Option<Outcome> {
        self.history.get(&date).copied()
    }

    /// Applies one outcome for `date`, correcting rather than double-counting.
    ///
    /// Returns `false` when the same outcome was already recorded for the date.
    pub(crate) fn record(&mut self, date: NaiveDate, outcome: Outcome) -> bool {
        match self.history.insert(date, outcome) {
            Some(previous) if previous == outcome => false,
            Some(previous) => {
                self.decrement(previous);
                self.increment(outcome);
                true
            }
            None => {
                self.increment(outcome);
                true
            }
        }
    }

    fn increment(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Attended => self.attended = self.attended.saturating_add(1),
            Outcome::Missed => self.missed = self.missed.saturating_add(1),
        }
    }

    fn decrement(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Attended => self.attended = self.attended.saturating_sub(1),
            Outcome::Missed => self.missed = self.missed.saturating_sub(1),
        }
    }
}

/// Accepts the canonical `{date: outcome}` map as well as the older
/// `[[date, "Present"], ...]` list, where the last entry for a date wins.
fn deserialize_history<'de, D>(deserializer: D) -> Result<BTreeMap<NaiveDate, Outcome>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum History {
        Map(BTreeMap<NaiveDate, Outcome>),
        Pairs(Vec<(NaiveDate, Outcome)>),
    }

    Ok(match History::deserialize(deserializer)? {
        History::Map(map) => map,
        History::Pairs(pairs) => pairs.into_iter().collect(),
    })
}
