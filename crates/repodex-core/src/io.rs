//! Filesystem side effects - reading dumped records, writing outputs
//!
//! Files are written through a temporary file in the destination directory
//! and renamed into place, so readers never observe a partially written
//! include. A single writer per output directory is assumed.

use repodex_schema::{PackageRecord, RecordError, RepoIndex};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::builder::DumpOutcome;
use crate::error::{BuildError, Result};
use crate::include::{IncludeDescriptor, JsonStyle};

/// Filename of the root document inside the output directory.
pub const ROOT_FILENAME: &str = "packages.json";

/// Counts of include files written and skipped by [`persist_includes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    /// Files written.
    pub written: usize,
    /// Files left alone because their hash-named file already existed.
    pub skipped: usize,
}

/// Load dumped package records from a JSON array.
///
/// With `skip_errors`, records lacking a string `name` or `version` are
/// dropped with a warning instead of failing the load.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a JSON array, or holds
/// an invalid record while `skip_errors` is off.
pub fn load_records(path: &Path, skip_errors: bool) -> Result<Vec<PackageRecord>> {
    let text = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    let raw: Vec<Value> = serde_json::from_str(&text)?;

    let mut records = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        let record = match value {
            Value::Object(attrs) => PackageRecord::new(attrs),
            _ => Err(RecordError::NotAnObject),
        };
        match record {
            Ok(record) => records.push(record),
            Err(source) if skip_errors => {
                tracing::warn!("Skipping record #{index}: {source}");
            }
            Err(source) => return Err(BuildError::InvalidRecord { index, source }),
        }
    }
    Ok(records)
}

/// Write an include file if its descriptor asks for it.
///
/// Returns `true` if a file was written.
///
/// # Errors
///
/// Returns [`BuildError::Io`] if the parent directory or the file cannot be
/// created.
pub fn persist_include(include: &IncludeDescriptor) -> Result<bool> {
    let Some(target) = &include.target else {
        return Ok(false);
    };
    write_atomic(target, &include.content)?;
    tracing::debug!("Wrote {}", target.display());
    Ok(true)
}

/// Write every pending include of a dump.
///
/// # Errors
///
/// Stops at the first file that cannot be written.
pub fn persist_includes(outcome: &DumpOutcome) -> Result<PersistSummary> {
    let mut summary = PersistSummary::default();
    for include in &outcome.includes {
        if persist_include(include)? {
            summary.written += 1;
        } else {
            summary.skipped += 1;
        }
    }
    Ok(summary)
}

/// Write the root document to `<output_dir>/packages.json`.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized or written.
pub fn write_root(index: &RepoIndex, output_dir: &Path, style: JsonStyle) -> Result<PathBuf> {
    let path = output_dir.join(ROOT_FILENAME);
    let content = style.encode(index)?;
    write_atomic(&path, &content)?;
    Ok(path)
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| BuildError::io(parent, e))?;
    tmp.write_all(content).map_err(|e| BuildError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| BuildError::io(path, e.error))?;
    Ok(())
}
