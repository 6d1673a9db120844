//! Persisted changelog file.
//!
//! Two on-disk shapes are accepted: a bare JSON list of entries, or an
//! object holding the list under `entries` next to arbitrary metadata.
//! Saving keeps whichever shape was loaded.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::constants::ENTRIES_KEY;
use crate::models::ChangelogEntry;

/// Errors reading or writing the changelog file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(
        "changelog file {path} is malformed: expected a JSON list of entries \
         or an object with an \"{ENTRIES_KEY}\" list"
    )]
    Malformed { path: PathBuf },

    #[error("failed to access changelog file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize changelog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("changelog file {0} already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

/// Which top-level layout the file uses.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangelogShape {
    /// The top-level value is the entry list.
    Bare,
    /// The top-level value is an object with the list under `entries`.
    Keyed { document: Map<String, Value> },
}

/// Entries read from disk, newest first, plus the shape to write back.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedChangelog {
    pub entries: Vec<ChangelogEntry>,
    pub shape: ChangelogShape,
}

impl LoadedChangelog {
    /// Put `entry` in front of the existing ones.
    pub fn prepend(&mut self, entry: ChangelogEntry) {
        self.entries.insert(0, entry);
    }
}

/// Metadata header written by `chlog init`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangelogDocument {
    pub title: String,
    pub description: String,
    pub repository: String,
    pub entries: Vec<ChangelogEntry>,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read the changelog at `path`, creating it as `[]` if it does not exist.
pub fn load(path: &Path) -> Result<LoadedChangelog, StoreError> {
    let empty = LoadedChangelog {
        entries: Vec::new(),
        shape: ChangelogShape::Bare,
    };

    if !path.exists() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error(path))?;
        }
        std::fs::write(path, "[]\n").map_err(io_error(path))?;
        tracing::debug!(path = %path.display(), "created empty changelog");
        return Ok(empty);
    }

    let content = std::fs::read_to_string(path).map_err(io_error(path))?;
    if content.trim().is_empty() {
        return Ok(empty);
    }

    if let Ok(entries) = serde_json::from_str::<Vec<ChangelogEntry>>(&content) {
        return Ok(LoadedChangelog {
            entries,
            shape: ChangelogShape::Bare,
        });
    }

    let malformed = || StoreError::Malformed {
        path: path.to_path_buf(),
    };
    let document: Map<String, Value> = serde_json::from_str(&content).map_err(|_| malformed())?;
    let list = document.get(ENTRIES_KEY).cloned().ok_or_else(malformed)?;
    let entries: Vec<ChangelogEntry> = serde_json::from_value(list).map_err(|_| malformed())?;

    Ok(LoadedChangelog {
        entries,
        shape: ChangelogShape::Keyed { document },
    })
}

/// Write `entries` back to `path` in the given shape.
///
/// For the keyed shape the file is re-read and only the `entries` value is
/// replaced, so sibling fields and their order survive.
pub fn save(path: &Path, shape: &ChangelogShape, entries: &[ChangelogEntry]) -> Result<(), StoreError> {
    let output = match shape {
        ChangelogShape::Bare => serde_json::to_string_pretty(entries)?,
        ChangelogShape::Keyed { .. } => {
            let content = std::fs::read_to_string(path).map_err(io_error(path))?;
            let mut document: Map<String, Value> =
                serde_json::from_str(&content).map_err(|_| StoreError::Malformed {
                    path: path.to_path_buf(),
                })?;
            // Insert on an existing key keeps its position.
            document.insert(ENTRIES_KEY.to_string(), serde_json::to_value(entries)?);
            serde_json::to_string_pretty(&document)?
        }
    };

    std::fs::write(path, format!("{output}\n")).map_err(io_error(path))?;
    tracing::info!(path = %path.display(), entries = entries.len(), "changelog written");
    Ok(())
}

/// Write a new keyed changelog document.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn init(path: &Path, document: &ChangelogDocument, force: bool) -> Result<(), StoreError> {
    if path.exists() && !force {
        return Err(StoreError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error(path))?;
    }
    let output = serde_json::to_string_pretty(document)?;
    std::fs::write(path, format!("{output}\n")).map_err(io_error(path))?;
    Ok(())
}
