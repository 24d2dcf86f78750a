//! Storage layer for the billing ledger.
//!
//! Each project keeps its ledger in one JSON document:
//!
//! ```json
//! {
//!     "current": { "start": "2024-01-01T09:00:00.000000", "precision": 900 },
//!     "history": [
//!         { "type": "shift", "start": "...", "end": "...", "precision": 900 },
//!         { "type": "payment", "amount": 150.0, "date": "..." }
//!     ]
//! }
//! ```
//!
//! # Writes
//!
//! A save serializes into a sibling temp file and renames it over the
//! destination, so a failed write leaves the previous document in place.
//! There is no locking: one process is assumed to own a ledger file at a time.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use bill_core::LedgerSnapshot;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The ledger file exists but could not be read or written.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The ledger file is not a valid ledger document.
    #[error("invalid ledger document {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The ledger could not be serialized.
    #[error("failed to encode ledger for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The JSON document backing one project's ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFile {
    path: PathBuf,
}

impl LedgerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the ledger document.
    ///
    /// Returns `None` if the file doesn't exist.
    /// Returns an error if the file exists but is unreadable or malformed.
    pub fn load(&self) -> Result<Option<LedgerSnapshot>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no ledger file yet");
                return Ok(None);
            }
            Err(source) => return Err(self.io_error(source)),
        };

        let snapshot = serde_json::from_str(&content).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(snapshot))
    }

    /// Writes the ledger document, creating its directory if needed.
    pub fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                tracing::debug!(path = %parent.display(), "creating ledger directory");
            }
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let temp_path = self.temp_path();
        let result = self.write_to(&temp_path, snapshot).and_then(|()| {
            fs::rename(&temp_path, &self.path).map_err(|source| self.io_error(source))
        });
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn write_to(&self, temp_path: &Path, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        let file = File::create(temp_path).map_err(|source| self.io_error(source))?;
        let mut writer = BufWriter::new(file);

        let mut serializer =
            serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        snapshot
            .serialize(&mut serializer)
            .map_err(|source| StoreError::Encode {
                path: self.path.clone(),
                source,
            })?;

        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|source| self.io_error(source))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|source| self.io_error(source))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
