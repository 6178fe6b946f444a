// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Small persistent key/value store.
//!
//! Holds the session token and display preferences in a JSON file under the
//! platform data directory.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const TOKEN_KEY: &str = "token";
pub const DARK_MODE_KEY: &str = "dark_mode";

/// Key/value pairs mirrored to a JSON file on every write.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Default location: `<data dir>/pdfbox/storage.json`.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("pdfbox")
            .join("storage.json")
    }

    /// Open the store at `path`. A missing or unreadable file yields an
    /// empty store; the next write recreates it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_values(&path) {
            Ok(values) => values,
            Err(e) => {
                if path.exists() {
                    log::warn!("Ignoring unreadable storage {}: {:#}", path.display(), e);
                }
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.values.insert(key.to_string(), value.into());
        self.flush()
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json).with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, String>> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(dir.path().join("storage.json"));
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[test]
    fn test_set_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut storage = LocalStorage::open(&path);
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(DARK_MODE_KEY, "true").unwrap();

        let reopened = LocalStorage::open(&path);
        assert_eq!(reopened.get(TOKEN_KEY), Some("abc"));
        assert_eq!(reopened.get(DARK_MODE_KEY), Some("true"));
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut storage = LocalStorage::open(&path);
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.remove(TOKEN_KEY).unwrap();
        storage.remove("never-set").unwrap();

        assert_eq!(LocalStorage::open(&path).get(TOKEN_KEY), None);
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = LocalStorage::open(&path);
        assert_eq!(storage.get(TOKEN_KEY), None);
    }
}
