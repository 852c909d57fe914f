//! Locked load/mutate/save cycles over both documents.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use att_core::{Day, Outcome, Subjects, Target, Timetable};
use chrono::NaiveDate;
use fs2::FileExt;

use crate::StoreError;
use crate::file::{LoadState, Loaded, StoreFile};

const SUBJECTS_FILE: &str = "data.json";
const TIMETABLE_FILE: &str = "timetable.json";
const LOCK_FILE: &str = ".lock";

/// A consistent read-only view of both documents.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub subjects: Subjects,
    pub timetable: Timetable,
    pub subjects_state: LoadState,
    pub timetable_state: LoadState,
}

impl Snapshot {
    /// File name and parse error of each document that was treated as empty
    /// because it could not be parsed.
    pub fn malformed(&self) -> Vec<(&'static str, &str)> {
        [
            (SUBJECTS_FILE, &self.subjects_state),
            (TIMETABLE_FILE, &self.timetable_state),
        ]
        .into_iter()
        .filter_map(|(name, state)| state.malformed_reason().map(|reason| (name, reason)))
        .collect()
    }
}

/// What a timetable import changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Subjects registered because they appeared in the import.
    pub created: Vec<String>,
    /// Names left out because no such subject exists.
    pub skipped: Vec<String>,
    /// Days whose schedule was replaced.
    pub days: usize,
}

/// Entry point for every read and mutation of tracker state.
///
/// Each method is one atomic cycle: lock, load both documents, apply, save
/// whatever changed, unlock. A rejected operation saves nothing.
#[derive(Debug)]
pub struct Tracker {
    data_dir: PathBuf,
    days: Vec<Day>,
    subjects: StoreFile<Subjects>,
    timetable: StoreFile<Timetable>,
}

impl Tracker {
    /// Opens the tracker in `data_dir`, creating the directory if needed.
    ///
    /// `days` are the weekdays every timetable supports, in addition to any
    /// already present in `timetable.json`.
    pub fn open(data_dir: &Path, days: &[Day]) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|source| StoreError::Write {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            days: days.to_vec(),
            subjects: StoreFile::new(data_dir.join(SUBJECTS_FILE)),
            timetable: StoreFile::new(data_dir.join(TIMETABLE_FILE)),
        })
    }

    pub fn subjects_path(&self) -> &Path {
        self.subjects.path()
    }

    pub fn timetable_path(&self) -> &Path {
        self.timetable.path()
    }

    /// Reads both documents under the lock.
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let _lock = self.lock()?;
        let (subjects, timetable) = self.load()?;
        Ok(Snapshot {
            subjects: subjects.document,
            timetable: timetable.document,
            subjects_state: subjects.state,
            timetable_state: timetable.state,
        })
    }

    pub fn add_subject(&self, name: &str, target: i64) -> Result<String, StoreError> {
        let name = self.update(|subjects, _| subjects.add_subject(name, target))?;
        tracing::info!(subject = %name, target, "subject added");
        Ok(name)
    }

    /// Removes a subject and every timetable entry naming it.
    ///
    /// Returns how many timetable entries were dropped.
    pub fn remove_subject(&self, name: &str) -> Result<usize, StoreError> {
        let unscheduled = self.update(|subjects, timetable| {
            subjects.remove_subject(name)?;
            Ok(timetable.cascade_remove(name))
        })?;
        tracing::info!(subject = name, unscheduled, "subject removed");
        Ok(unscheduled)
    }

    pub fn record_outcome(
        &self,
        name: &str,
        date: NaiveDate,
        outcome: Outcome,
    ) -> Result<bool, StoreError> {
        let changed = self.update(|subjects, _| subjects.record_outcome(name, date, outcome))?;
        tracing::info!(subject = name, %date, %outcome, changed, "outcome recorded");
        Ok(changed)
    }

    pub fn add_to_day(&self, day: Day, subject: &str) -> Result<bool, StoreError> {
        let added = self.update(|subjects, timetable| timetable.add_to_day(day, subject, subjects))?;
        tracing::info!(%day, subject, added, "timetable entry added");
        Ok(added)
    }

    pub fn remove_from_day(&self, day: Day, subject: &str) -> Result<(), StoreError> {
        self.update(|_, timetable| timetable.remove_from_day(day, subject))?;
        tracing::info!(%day, subject, "timetable entry removed");
        Ok(())
    }

    pub fn subjects_for(&self, day: Day) -> Result<Vec<String>, StoreError> {
        Ok(self.snapshot()?.timetable.subjects_for(day).to_vec())
    }

    /// Replaces the schedule of every day in `schedule`.
    ///
    /// Unregistered names are registered with `create_missing` as their
    /// target when given, and otherwise left out and reported as skipped.
    pub fn import_timetable(
        &self,
        schedule: &BTreeMap<Day, Vec<String>>,
        create_missing: Option<Target>,
    ) -> Result<ImportReport, StoreError> {
        let report = self.update(|subjects, timetable| {
            let mut report = ImportReport::default();
            timetable.ensure_days(&schedule.keys().copied().collect::<Vec<_>>());

            for (day, names) in schedule {
                let mut kept = Vec::with_capacity(names.len());
                for name in names {
                    if !subjects.contains(name) {
                        match create_missing {
                            Some(target) => {
                                subjects.add_subject(name, i64::from(target.get()))?;
                                report.created.push(name.clone());
                            }
                            None => {
                                if !report.skipped.contains(name) {
                                    report.skipped.push(name.clone());
                                }
                                continue;
                            }
                        }
                    }
                    kept.push(name.clone());
                }
                timetable.replace_day(*day, &kept, subjects)?;
                report.days += 1;
            }
            Ok(report)
        })?;

        for name in &report.skipped {
            tracing::warn!(subject = %name, "skipped unregistered subject in timetable import");
        }
        tracing::info!(
            days = report.days,
            created = report.created.len(),
            skipped = report.skipped.len(),
            "timetable imported"
        );
        Ok(report)
    }

    /// Runs one locked cycle, saving each document only if it changed.
    ///
    /// Both documents are written to temp files before either is renamed into
    /// place, so a failed write leaves both files as they were. A malformed
    /// file about to be replaced is first copied to `<name>.json.bak`.
    fn update<R>(
        &self,
        apply: impl FnOnce(&mut Subjects, &mut Timetable) -> att_core::Result<R>,
    ) -> Result<R, StoreError> {
        let _lock = self.lock()?;
        let (subjects, timetable) = self.load()?;
        let (mut new_subjects, mut new_timetable) =
            (subjects.document.clone(), timetable.document.clone());

        let result = apply(&mut new_subjects, &mut new_timetable)?;

        let subjects_changed = new_subjects != subjects.document;
        let timetable_changed = new_timetable != timetable.document;

        if subjects_changed && subjects.state.malformed_reason().is_some() {
            self.subjects.back_up()?;
        }
        if timetable_changed && timetable.state.malformed_reason().is_some() {
            self.timetable.back_up()?;
        }

        let staged_subjects = if subjects_changed {
            Some(self.subjects.stage(&new_subjects)?)
        } else {
            None
        };
        let staged_timetable = if timetable_changed {
            match self.timetable.stage(&new_timetable) {
                Ok(staged) => Some(staged),
                Err(err) => {
                    if let Some(staged) = staged_subjects {
                        staged.discard();
                    }
                    return Err(err);
                }
            }
        } else {
            None
        };

        if let Some(staged) = staged_subjects {
            staged.commit()?;
        }
        if let Some(staged) = staged_timetable {
            staged.commit()?;
        }
        Ok(result)
    }

    fn load(&self) -> Result<(Loaded<Subjects>, Loaded<Timetable>), StoreError> {
        let subjects = self.subjects.load()?;
        let mut timetable = self.timetable.load()?;
        timetable.document.ensure_days(&self.days);
        Ok((subjects, timetable))
    }

    /// Takes the exclusive data directory lock; released when the file drops.
    fn lock(&self) -> Result<File, StoreError> {
        let path = self.data_dir.join(LOCK_FILE);
        let lock_err = |source| StoreError::Lock {
            path: path.clone(),
            source,
        };
        let file = File::create(&path).map_err(lock_err)?;
        file.lock_exclusive().map_err(lock_err)?;
        Ok(file)
    }
}
