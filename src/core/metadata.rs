//! The store compatibility gate.
//!
//! A store carries exactly one metadata record, written at `init` and read
//! back on every open. The version check is exact-string equality and a
//! mismatch is a hard error; there is no migration path.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::core::error::AntError;

/// Build-time version stamped into new stores and checked on every open.
pub const ANT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the metadata file inside the store root.
pub const METADATA_FILE: &str = ".ant";

const TAG_VERSION: &str = "VERSION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreMetadata {
    version: String,
}

impl StoreMetadata {
    /// Metadata for a store created by this build.
    pub fn current() -> Self {
        Self {
            version: ANT_VERSION.to_string(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Persist to `store_root/.ant`. Happens once, at store init.
    pub fn write(&self, store_root: &Path) -> Result<(), AntError> {
        let contents = format!("{TAG_VERSION} {}\n", self.version);
        fs::write(store_root.join(METADATA_FILE), contents).map_err(AntError::IoError)
    }

    /// Load from `store_root/.ant`.
    ///
    /// A missing or tag-less metadata file means the directory is not a
    /// valid store, whatever else it contains.
    pub fn read(store_root: &Path) -> Result<Self, AntError> {
        let path = store_root.join(METADATA_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(AntError::StoreNotInitialized(store_root.to_path_buf()));
            }
            Err(err) => return Err(AntError::IoError(err)),
        };
        let first_line = contents.lines().next().unwrap_or("");
        match first_line
            .strip_prefix(TAG_VERSION)
            .and_then(|rest| rest.strip_prefix(' '))
        {
            Some(version) if !version.is_empty() => Ok(Self {
                version: version.to_string(),
            }),
            _ => Err(AntError::StoreNotInitialized(store_root.to_path_buf())),
        }
    }

    /// Exact-string version gate applied on store open.
    pub fn ensure_compatible(&self) -> Result<(), AntError> {
        if self.version != ANT_VERSION {
            return Err(AntError::IncompatibleVersion {
                stored: self.version.clone(),
                current: ANT_VERSION.to_string(),
            });
        }
        Ok(())
    }
}
