//! The timetable store: weekday to the ordered subjects taught that day.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::subjects::Subjects;
use crate::types::Day;

/// Weekly schedule keyed by [`Day`].
///
/// The keys present are the supported days. Every scheduled name refers to a
/// registered subject: additions are checked against [`Subjects`] and
/// removals of a subject are cascaded through [`Timetable::cascade_remove`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable {
    days: BTreeMap<Day, Vec<String>>,
}

impl Timetable {
    /// An empty schedule supporting exactly `days`.
    #[must_use]
    pub fn with_days(days: &[Day]) -> Self {
        let mut timetable = Self::default();
        timetable.ensure_days(days);
        timetable
    }

    /// Adds an empty schedule for each of `days` that is not yet supported.
    pub fn ensure_days(&mut self, days: &[Day]) {
        for day in days {
            self.days.entry(*day).or_default();
        }
    }

    /// Supported days in calendar order.
    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.days.keys().copied()
    }

    #[must_use]
    pub fn supports(&self, day: Day) -> bool {
        self.days.contains_key(&day)
    }

    /// Schedules `subject` on `day`.
    ///
    /// Scheduling a subject twice on the same day is a no-op and returns `false`.
    pub fn add_to_day(&mut self, day: Day, subject: &str, subjects: &Subjects) -> Result<bool> {
        let scheduled = self.schedule_mut(day)?;
        if !subjects.contains(subject) {
            return Err(Error::SubjectNotFound(subject.to_string()));
        }
        if scheduled.iter().any(|s| s == subject) {
            return Ok(false);
        }
        scheduled.push(subject.to_string());
        tracing::debug!(%day, subject, "scheduled subject");
        Ok(true)
    }

    pub fn remove_from_day(&mut self, day: Day, subject: &str) -> Result<()> {
        let scheduled = self.schedule_mut(day)?;
        let Some(index) = scheduled.iter().position(|s| s == subject) else {
            return Err(Error::NotScheduled {
                day: day.to_string(),
                subject: subject.to_string(),
            });
        };
        scheduled.remove(index);
        tracing::debug!(%day, subject, "unscheduled subject");
        Ok(())
    }

    /// Replaces the whole schedule for `day`.
    ///
    /// Every name must be registered; on error the schedule is left untouched.
    /// Repeated names keep their first position.
    pub fn replace_day(&mut self, day: Day, names: &[String], subjects: &Subjects) -> Result<()> {
        if !self.supports(day) {
            return Err(Error::UnknownDay(day.to_string()));
        }
        if let Some(missing) = names.iter().find(|name| !subjects.contains(name)) {
            return Err(Error::SubjectNotFound(missing.clone()));
        }

        let mut replacement: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !replacement.contains(name) {
                replacement.push(name.clone());
            }
        }
        self.days.insert(day, replacement);
        Ok(())
    }

    /// Subjects scheduled on `day`, in order. Empty for unsupported days.
    #[must_use]
    pub fn subjects_for(&self, day: Day) -> &[String] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or_default()
    }

    /// Removes `subject` from every day. Returns how many entries were dropped.
    pub fn cascade_remove(&mut self, subject: &str) -> usize {
        let mut removed = 0;
        for scheduled in self.days.values_mut() {
            let before = scheduled.len();
            scheduled.retain(|s| s != subject);
            removed += before - scheduled.len();
        }
        if removed > 0 {
            tracing::debug!(subject, removed, "cascaded subject removal");
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, &[String])> {
        self.days.iter().map(|(day, names)| (*day, names.as_slice()))
    }

    fn schedule_mut(&mut self, day: Day) -> Result<&mut Vec<String>> {
        self.days
            .get_mut(&day)
            .ok_or_else(|| Error::UnknownDay(day.to_string()))
    }
}
