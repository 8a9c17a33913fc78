//! Source locations in `path:row` form.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::error::AntError;

/// A source file plus a 1-based row number.
///
/// The path is always source-root-relative; the store resolves it against
/// the source and annotation roots itself. Row `0` is reserved for the
/// whole-file form used by list queries and is never produced by `parse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    path: PathBuf,
    row: u32,
}

impl FileLocation {
    pub fn new(path: impl Into<PathBuf>, row: u32) -> Self {
        Self {
            path: path.into(),
            row,
        }
    }

    /// Whole-file location for list queries (row sentinel `0`).
    pub fn whole_file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, 0)
    }

    /// Parse a user-supplied `path:row` string.
    ///
    /// Splits on the first `:`; the suffix must be a positive integer. The
    /// `0` sentinel is rejected here, since `add` and `rm` address a real row.
    pub fn parse(location: &str) -> Result<Self, AntError> {
        let Some((path, row)) = location.split_once(':') else {
            return Err(AntError::MalformedLocation(location.to_string()));
        };
        let row: u32 = row
            .parse()
            .map_err(|_| AntError::MalformedLocation(location.to_string()))?;
        if row == 0 {
            return Err(AntError::MalformedLocation(location.to_string()));
        }
        Ok(Self::new(path, row))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn row(&self) -> u32 {
        self.row
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.row)
    }
}
