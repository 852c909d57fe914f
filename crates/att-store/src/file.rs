//! Whole-document JSON files.

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;

use crate::StoreError;

/// How a document was obtained by [`StoreFile::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// The file was read and parsed.
    Loaded,
    /// No file yet; the empty default was used.
    Missing,
    /// The file could not be parsed; the empty default was used.
    Malformed { reason: String },
}

impl LoadState {
    /// The parse error, when the file was malformed.
    pub fn malformed_reason(&self) -> Option<&str> {
        match self {
            Self::Malformed { reason } => Some(reason),
            Self::Loaded | Self::Missing => None,
        }
    }
}

/// A document together with how it was loaded.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub document: T,
    pub state: LoadState,
}

/// A JSON document that is always read and written in full.
///
/// Loading never fails on content: a missing or malformed file yields
/// `T::default()`. Only I/O errors other than "not found" are reported.
#[derive(Debug, Clone)]
pub struct StoreFile<T> {
    path: PathBuf,
    _document: PhantomData<fn() -> T>,
}

impl<T> StoreFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _document: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Loaded<T>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "store file missing, using empty default");
                return Ok(Loaded {
                    document: T::default(),
                    state: LoadState::Missing,
                });
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(document) => {
                tracing::debug!(path = %self.path.display(), "loaded store file");
                Ok(Loaded {
                    document,
                    state: LoadState::Loaded,
                })
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "malformed store file, using empty default"
                );
                Ok(Loaded {
                    document: T::default(),
                    state: LoadState::Malformed {
                        reason: err.to_string(),
                    },
                })
            }
        }
    }

    /// Replaces the file with `document`.
    ///
    /// Writes a sibling temp file first and renames it over the target, so a
    /// failed write never leaves a truncated document behind.
    pub fn save(&self, document: &T) -> Result<(), StoreError> {
        self.stage(document)?.commit()
    }

    /// Writes `document` to the sibling temp file without touching the target.
    pub fn stage(&self, document: &T) -> Result<Staged, StoreError> {
        let bytes = to_pretty_json(document)?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, &bytes).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        tracing::debug!(path = %tmp.display(), bytes = bytes.len(), "staged store file");
        Ok(Staged {
            tmp,
            path: self.path.clone(),
        })
    }

    /// Copies the current file to `<name>.json.bak`, returning the copy's path.
    pub fn back_up(&self) -> Result<PathBuf, StoreError> {
        let backup = self.path.with_extension("json.bak");
        fs::copy(&self.path, &backup).map_err(|source| StoreError::Write {
            path: backup.clone(),
            source,
        })?;
        tracing::warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            "kept a copy of the malformed store file"
        );
        Ok(backup)
    }
}

/// A document written to its temp file, waiting to replace the target.
#[derive(Debug)]
#[must_use = "a staged document is not saved until committed"]
pub struct Staged {
    tmp: PathBuf,
    path: PathBuf,
}

impl Staged {
    /// Renames the temp file over the target.
    pub fn commit(self) -> Result<(), StoreError> {
        fs::rename(&self.tmp, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "saved store file");
        Ok(())
    }

    /// Removes the temp file, leaving the target untouched.
    pub fn discard(self) {
        if let Err(err) = fs::remove_file(&self.tmp) {
            tracing::debug!(path = %self.tmp.display(), error = %err, "could not remove staged file");
        }
    }
}

/// Pretty JSON with four-space indentation and a trailing newline.
fn to_pretty_json<T: Serialize>(document: &T) -> Result<Vec<u8>, StoreError> {
    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
    document.serialize(&mut serializer)?;
    bytes.push(b'\n');
    Ok(bytes)
}
