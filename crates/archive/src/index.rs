//! Archive listing, lookup and deletion.
//!
//! The index is recomputed from the store on every call; nothing is cached
//! between requests.

use std::sync::Arc;

use novagen_core::naming::split_entry_key;
use novagen_core::record::{gallery_images, GalleryImage, GenerationRecord};

use crate::error::{ArchiveError, Result};
use crate::store::EntryStore;

/// Read and delete access to archived generations.
#[derive(Clone)]
pub struct ArchiveIndex {
    store: Arc<dyn EntryStore>,
}

impl ArchiveIndex {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }

    /// Every readable record, newest first.
    ///
    /// Entries without a record are skipped silently; entries whose record
    /// cannot be read or parsed are skipped with a warning. A missing
    /// output root yields an empty list.
    pub async fn list_all(&self) -> Result<Vec<GenerationRecord>> {
        let keys = self.store.list_keys().await?;
        let mut records = Vec::with_capacity(keys.len());

        for key in keys {
            match self.store.get_record(&key).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => tracing::warn!(key = %key, error = %e, "Skipping unreadable archive entry"),
            }
        }

        Ok(records)
    }

    /// Every archived image across all records, newest record first.
    pub async fn gallery(&self) -> Result<Vec<GalleryImage>> {
        Ok(gallery_images(&self.list_all().await?))
    }

    /// Find the entry holding `message_id`, returning its key and record.
    pub async fn find(&self, message_id: &str) -> Result<Option<(String, GenerationRecord)>> {
        let keys = self.store.list_keys().await?;
        let Some(key) = find_entry_key(&keys, message_id) else {
            return Ok(None);
        };
        Ok(self
            .store
            .get_record(key)
            .await?
            .map(|record| (key.to_string(), record)))
    }

    /// Delete the entry for `message_id`. Returns `false` when nothing
    /// matched, so repeated deletes are safe.
    ///
    /// At most one entry is removed; see [`find_entry_key`] for which one.
    pub async fn delete(&self, message_id: &str) -> Result<bool> {
        if message_id.trim().is_empty() {
            return Err(ArchiveError::InvalidKey(message_id.to_string()));
        }

        let keys = self.store.list_keys().await?;
        let Some(key) = find_entry_key(&keys, message_id) else {
            tracing::info!(message_id, "No archive entry to delete");
            return Ok(false);
        };

        let deleted = self.store.delete_entry(key).await?;
        if deleted {
            tracing::info!(message_id, key = %key, "Deleted archive entry");
        }
        Ok(deleted)
    }
}

/// Pick the entry key belonging to `message_id` from keys sorted newest
/// first.
///
/// A key whose id segment equals `message_id` exactly wins. Otherwise the
/// newest key containing `message_id` as a substring is used, which keeps
/// directories that do not follow the naming convention reachable.
pub fn find_entry_key<'a>(keys: &'a [String], message_id: &str) -> Option<&'a str> {
    if message_id.is_empty() {
        return None;
    }

    keys.iter()
        .find(|key| split_entry_key(key).is_some_and(|(_, id)| id == message_id))
        .or_else(|| keys.iter().find(|key| key.contains(message_id)))
        .map(String::as_str)
}
