//! Entry storage.
//!
//! [`EntryStore`] is the only way the writer and index touch persistent
//! state. [`FsEntryStore`] implements it with one directory per entry under
//! the output root, which is the layout the static file server expects.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use novagen_core::naming::METADATA_FILE;
use novagen_core::record::GenerationRecord;

use crate::error::{ArchiveError, Result};

/// Keyed storage for archive entries.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Create the entry if it does not exist yet. Idempotent.
    async fn ensure_entry(&self, key: &str) -> Result<()>;

    /// Store one image file inside an existing entry.
    async fn put_image(&self, key: &str, filename: &str, bytes: &[u8]) -> Result<()>;

    /// Store (or replace) the entry's metadata record.
    async fn put_record(&self, key: &str, record: &GenerationRecord) -> Result<()>;

    /// All entry keys, sorted descending. Entries without a record are
    /// included; a missing store yields an empty list.
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// The entry's record, or `None` if the entry has no record.
    async fn get_record(&self, key: &str) -> Result<Option<GenerationRecord>>;

    /// Remove the entry and everything in it. Returns `false` if it did not
    /// exist.
    async fn delete_entry(&self, key: &str) -> Result<bool>;
}

/// Directory-per-entry store rooted at the output directory.
#[derive(Debug, Clone)]
pub struct FsEntryStore {
    root: PathBuf,
}

impl FsEntryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the output root (and parents) if missing. Idempotent.
    pub async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `key` to a directory directly under the root.
    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        validate_component(key)?;
        Ok(self.root.join(key))
    }
}

/// Reject anything that is not a single, plain path component.
fn validate_component(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(ArchiveError::InvalidKey(name.to_string()));
    }
    Ok(())
}

#[async_trait]
impl EntryStore for FsEntryStore {
    async fn ensure_entry(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        tokio::fs::create_dir_all(path).await?;
        Ok(())
    }

    async fn put_image(&self, key: &str, filename: &str, bytes: &[u8]) -> Result<()> {
        validate_component(filename)?;
        let path = self.entry_path(key)?.join(filename);
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn put_record(&self, key: &str, record: &GenerationRecord) -> Result<()> {
        let dir = self.entry_path(key)?;
        let json = serde_json::to_vec_pretty(record)?;

        // Write-then-rename so a concurrent listing never sees half a file.
        let tmp = dir.join(format!("{METADATA_FILE}.tmp"));
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, dir.join(METADATA_FILE)).await?;
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => keys.push(name),
                Err(raw) => tracing::warn!(name = ?raw, "Skipping non UTF-8 archive directory"),
            }
        }

        keys.sort_unstable_by(|a, b| b.cmp(a));
        Ok(keys)
    }

    async fn get_record(&self, key: &str) -> Result<Option<GenerationRecord>> {
        let path = self.entry_path(key)?.join(METADATA_FILE);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn delete_entry(&self, key: &str) -> Result<bool> {
        let path = self.entry_path(key)?;
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(id: &str) -> GenerationRecord {
        GenerationRecord::new(id, "20240101_120000", "prompt", vec![], vec![], json!({}))
    }

    #[tokio::test]
    async fn missing_root_lists_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsEntryStore::new(tmp.path().join("does-not-exist"));
        assert!(store.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_keys_is_descending_and_skips_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsEntryStore::new(tmp.path());
        for key in ["20240101_000000_a", "20240301_000000_c", "20240201_000000_b"] {
            store.ensure_entry(key).await.unwrap();
        }
        tokio::fs::write(tmp.path().join("stray.txt"), b"x").await.unwrap();

        assert_eq!(
            store.list_keys().await.unwrap(),
            ["20240301_000000_c", "20240201_000000_b", "20240101_000000_a"]
        );
    }

    #[tokio::test]
    async fn record_round_trip_and_missing_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsEntryStore::new(tmp.path());
        store.ensure_entry("k1").await.unwrap();
        assert_eq!(store.get_record("k1").await.unwrap(), None);

        store.put_record("k1", &record("abc")).await.unwrap();
        let loaded = store.get_record("k1").await.unwrap().unwrap();
        assert_eq!(loaded.message_id, "abc");
        assert!(!tmp.path().join("k1").join("metadata.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_record_is_json_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsEntryStore::new(tmp.path());
        store.ensure_entry("k1").await.unwrap();
        tokio::fs::write(tmp.path().join("k1").join(METADATA_FILE), b"{ nope")
            .await
            .unwrap();

        assert!(matches!(
            store.get_record("k1").await,
            Err(ArchiveError::Json(_))
        ));
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsEntryStore::new(tmp.path());
        store.ensure_entry("k1").await.unwrap();
        store.put_image("k1", "image_1.png", b"png").await.unwrap();

        assert!(store.delete_entry("k1").await.unwrap());
        assert!(!tmp.path().join("k1").exists());
        assert!(!store.delete_entry("k1").await.unwrap());
    }

    #[tokio::test]
    async fn keys_cannot_escape_root() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsEntryStore::new(tmp.path().join("out"));
        for key in ["..", "../x", "a/b", "", "."] {
            assert!(
                matches!(store.ensure_entry(key).await, Err(ArchiveError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
        assert!(matches!(
            store.put_image("k", "../evil.png", b"").await,
            Err(ArchiveError::InvalidKey(_))
        ));
    }
}
