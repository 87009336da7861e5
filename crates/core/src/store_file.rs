//! Single-file JSON progression store.
//!
//! Layout:
//! - `format_version`: currently `1`; other versions are refused.
//! - `entries`: the key-value map, keys sorted.
//! - `sha256_hex`: SHA-256 of the compact JSON of `entries`, checked on open.
//!
//! Every write rewrites the file through a temp file and rename.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::progression::{ProgressionStore, StoreError};

pub const STORE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StoreFile {
    format_version: u32,
    sha256_hex: String,
    entries: BTreeMap<String, Value>,
}

fn entries_sha256(entries: &BTreeMap<String, Value>) -> Result<String, StoreError> {
    let json = serde_json::to_string(entries)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let result = hasher.finalize();
    Ok(format!("{result:064x}"))
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFileStore {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "Minefloor").map(|proj_dirs| {
            let mut path = proj_dirs.data_dir().to_path_buf();
            path.push("progression.json");
            path
        })
    }

    /// Opens `path`, treating a missing file as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no progression file yet");
                return Ok(Self { path, entries: BTreeMap::new() });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let file: StoreFile = serde_json::from_str(&content)?;
        if file.format_version != STORE_FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(file.format_version));
        }
        let actual = entries_sha256(&file.entries)?;
        if actual != file.sha256_hex {
            return Err(StoreError::ChecksumMismatch { expected: file.sha256_hex, actual });
        }
        Ok(Self { path, entries: file.entries })
    }

    /// Like [`Self::open`], but an unreadable file is logged and replaced by an empty store.
    pub fn open_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(path.clone()) {
            Ok(store) => store,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "discarding unreadable progression file");
                Self { path, entries: BTreeMap::new() }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source: io::Error| StoreError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = StoreFile {
            format_version: STORE_FORMAT_VERSION,
            sha256_hex: entries_sha256(&self.entries)?,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl ProgressionStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
