//! The annotation store: one append-only log per annotated source file.
//!
//! The store mirrors the source tree under its own root: annotations for
//! `src/lib.rs` live in `<store_root>/src/lib.rs.ant`. Adding an annotation
//! only ever appends, so stale rows for a re-annotated line accumulate on
//! disk until a `list` or `remove` rewrites the log through the compaction
//! path. Compaction goes through a temp file and an atomic rename; that
//! rename is the store's only concurrency-safety primitive, and callers are
//! expected to serialize access to a store root.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::BufReader;
use std::io::prelude::*;
use std::path::{Component, Path, PathBuf};

use crate::core::error::AntError;
use crate::core::location::FileLocation;
use crate::core::metadata::StoreMetadata;
use crate::core::record::Annotation;

/// Suffix appended to a mirrored source path to name its log file.
pub const LOG_SUFFIX: &str = ".ant";

/// Handle on an opened store: where the source tree lives, where the logs
/// live, and the metadata that gated the open.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    source_root: PathBuf,
    store_root: PathBuf,
    meta: StoreMetadata,
}

impl AnnotationStore {
    /// Create a store root and stamp it with fresh metadata.
    ///
    /// Idempotent: an existing root is left untouched and reported as
    /// `Ok(false)`, so setup can be re-run safely.
    pub fn init(store_root: &Path) -> Result<bool, AntError> {
        if store_root.exists() {
            return Ok(false);
        }
        fs::create_dir_all(store_root).map_err(AntError::IoError)?;
        StoreMetadata::current().write(store_root)?;
        Ok(true)
    }

    /// Open an existing store, gating on its persisted metadata version.
    pub fn open(source_root: &Path, store_root: &Path) -> Result<Self, AntError> {
        if !store_root.exists() {
            return Err(AntError::StoreNotInitialized(store_root.to_path_buf()));
        }
        let meta = StoreMetadata::read(store_root)?;
        meta.ensure_compatible()?;
        Ok(Self {
            source_root: source_root.to_path_buf(),
            store_root: store_root.to_path_buf(),
            meta,
        })
    }

    pub fn metadata(&self) -> &StoreMetadata {
        &self.meta
    }

    /// Append one annotation for `location`.
    ///
    /// O(1) in log size: the log is opened in append mode and existing
    /// records are never read. The anchor is captured before the store is
    /// touched, so a failed append leaves no log behind.
    pub fn append(&self, location: &FileLocation, text: &str) -> Result<(), AntError> {
        ensure_source_relative(location.path())?;

        let source = self.source_root.join(location.path());
        if !source.exists() {
            return Err(AntError::SourceNotFound(location.path().to_path_buf()));
        }
        if source.is_dir() {
            return Err(AntError::InvalidTarget(location.path().to_path_buf()));
        }

        let anchor = read_source_row(&source, location)?;
        let record = Annotation::new(text, &anchor, location.clone())?;

        let log = self.log_path(location.path());
        if let Some(parent) = log.parent() {
            fs::create_dir_all(parent).map_err(AntError::IoError)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log)
            .map_err(AntError::IoError)?;
        record.serialize(&mut file)
    }

    /// Remove the annotation at `location`, if there is one.
    ///
    /// A row with nothing on it is a silent no-op; only a file with no log
    /// at all is `NoAnnotations`. The log is rewritten only when the
    /// deduplicated record set actually shrank; a no-op remove does not
    /// opportunistically compact stale duplicates (the next `list` will).
    pub fn remove(&self, location: &FileLocation) -> Result<(), AntError> {
        ensure_source_relative(location.path())?;

        let (_, records) = self.load_deduped(location.path())?;
        let kept: Vec<Annotation> = records
            .iter()
            .filter(|record| record.row() != location.row())
            .cloned()
            .collect();
        if kept.len() != records.len() {
            self.compact(location.path(), &kept)?;
        }
        Ok(())
    }

    /// List the current annotations for `path`, one per row, ascending.
    ///
    /// Self-healing: when the raw log carried superseded rows, it is
    /// compacted in place so the dedup cost is paid once, not on every
    /// read after.
    pub fn list(&self, path: &Path) -> Result<Vec<Annotation>, AntError> {
        ensure_source_relative(path)?;

        let (raw_count, records) = self.load_deduped(path)?;
        if records.len() < raw_count {
            self.compact(path, &records)?;
        }
        Ok(records)
    }

    /// Absolute path of the log mirroring a source-relative `path`.
    fn log_path(&self, path: &Path) -> PathBuf {
        let mut log = self.store_root.join(path).into_os_string();
        log.push(LOG_SUFFIX);
        PathBuf::from(log)
    }

    /// Read every record for `path` in append order and apply the dedup
    /// rule: scanning from the most recent append backwards, the first
    /// record seen for a row wins. Returns the raw on-disk record count
    /// plus the survivors sorted into ascending row order.
    fn load_deduped(&self, path: &Path) -> Result<(usize, Vec<Annotation>), AntError> {
        let log = self.log_path(path);
        if !log.exists() {
            return Err(AntError::NoAnnotations(path.to_path_buf()));
        }
        let file = File::open(&log).map_err(AntError::IoError)?;
        let mut input = BufReader::new(file);

        let mut raw = Vec::new();
        while let Some(record) = Annotation::deserialize(&mut input, path)? {
            raw.push(record);
        }
        let raw_count = raw.len();

        let mut seen_rows = HashSet::new();
        let mut records: Vec<Annotation> = raw
            .into_iter()
            .rev()
            .filter(|record| seen_rows.insert(record.row()))
            .collect();
        records.sort_by_key(|record| record.row());
        Ok((raw_count, records))
    }

    /// Rewrite the log for `path` to exactly `records`: serialize into a
    /// temp file beside the target, then rename over it. A reader observes
    /// the old content or the new content, never a truncated mix.
    fn compact(&self, path: &Path, records: &[Annotation]) -> Result<(), AntError> {
        let log = self.log_path(path);
        let mut tmp = log.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut buf = Vec::new();
        for record in records {
            record.serialize(&mut buf)?;
        }
        fs::write(&tmp, &buf).map_err(AntError::IoError)?;
        fs::rename(&tmp, &log).map_err(AntError::IoError)?;
        Ok(())
    }
}

/// Literal content of the 1-based `location` row in the source file.
fn read_source_row(source: &Path, location: &FileLocation) -> Result<String, AntError> {
    let out_of_range = || AntError::LineOutOfRange {
        row: location.row(),
        path: location.path().to_path_buf(),
    };
    // Row 0 (the whole-file sentinel) has no line to capture.
    let index = location.row().checked_sub(1).ok_or_else(out_of_range)? as usize;

    let file = File::open(source).map_err(AntError::IoError)?;
    BufReader::new(file)
        .lines()
        .nth(index)
        .transpose()
        .map_err(AntError::IoError)?
        .ok_or_else(out_of_range)
}

/// Callers address sources by source-root-relative paths; anything that
/// could resolve outside the roots is refused before any I/O.
fn ensure_source_relative(path: &Path) -> Result<(), AntError> {
    let escapes = path.as_os_str().is_empty()
        || path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir));
    if escapes {
        return Err(AntError::PathError(format!(
            "source path must be relative to the source root: {}",
            path.display()
        )));
    }
    Ok(())
}
