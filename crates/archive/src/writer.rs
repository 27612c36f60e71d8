//! Materializes a completed job into an archive entry.

use std::sync::Arc;

use chrono::Local;
use serde_json::Value;

use novagen_core::naming::{
    entry_key, format_timestamp, image_filename, served_path, validate_message_id,
};
use novagen_core::record::GenerationRecord;

use crate::error::{ArchiveError, Result};
use crate::fetcher::ImageFetcher;
use crate::index::find_entry_key;
use crate::store::EntryStore;

/// Downloads a job's images and writes its metadata record.
#[derive(Clone)]
pub struct ArchiveWriter {
    store: Arc<dyn EntryStore>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl ArchiveWriter {
    pub fn new(store: Arc<dyn EntryStore>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { store, fetcher }
    }

    /// Archive a completed job, stamped with the current local time.
    ///
    /// Returns the served paths of the images that were saved. Never
    /// fails: individual download failures are skipped, and any storage
    /// failure is logged and yields an empty list.
    ///
    /// If the job is already archived, the existing entry is left
    /// untouched and its paths are returned.
    pub async fn persist(
        &self,
        message_id: &str,
        image_urls: &[String],
        prompt: &str,
        raw_response: &Value,
    ) -> Vec<String> {
        let timestamp = format_timestamp(&Local::now());
        self.persist_at(&timestamp, message_id, image_urls, prompt, raw_response)
            .await
    }

    /// [`persist`](Self::persist) with an explicit `YYYYMMDD_HHMMSS` stamp.
    pub async fn persist_at(
        &self,
        timestamp: &str,
        message_id: &str,
        image_urls: &[String],
        prompt: &str,
        raw_response: &Value,
    ) -> Vec<String> {
        match self
            .try_persist(timestamp, message_id, image_urls, prompt, raw_response)
            .await
        {
            Ok(paths) => paths,
            Err(e) => {
                tracing::error!(message_id, error = %e, "Failed to archive generation");
                Vec::new()
            }
        }
    }

    async fn try_persist(
        &self,
        timestamp: &str,
        message_id: &str,
        image_urls: &[String],
        prompt: &str,
        raw_response: &Value,
    ) -> Result<Vec<String>> {
        validate_message_id(message_id)
            .map_err(|_| ArchiveError::InvalidKey(message_id.to_string()))?;

        if let Some(existing) = self.existing_record(message_id).await? {
            tracing::debug!(message_id, "Generation already archived");
            return Ok(existing.images);
        }

        let key = entry_key(timestamp, message_id);
        self.store.ensure_entry(&key).await?;

        let mut local_paths = Vec::with_capacity(image_urls.len());
        for (index, url) in image_urls.iter().enumerate() {
            let filename = image_filename(index, url);
            match self.download_one(&key, &filename, url).await {
                Ok(()) => local_paths.push(served_path(&key, &filename)),
                Err(e) => tracing::warn!(
                    message_id,
                    image = index + 1,
                    url = %url,
                    error = %e,
                    "Skipping image that failed to download",
                ),
            }
        }

        let record = GenerationRecord::new(
            message_id,
            timestamp,
            prompt,
            local_paths,
            image_urls.to_vec(),
            raw_response.clone(),
        );
        self.store.put_record(&key, &record).await?;

        tracing::info!(
            message_id,
            key = %key,
            saved = record.image_count,
            requested = image_urls.len(),
            "Archived generation",
        );

        Ok(record.images)
    }

    async fn download_one(&self, key: &str, filename: &str, url: &str) -> Result<()> {
        let bytes = self.fetcher.fetch(url).await?;
        self.store.put_image(key, filename, &bytes).await
    }

    /// The record of an earlier archive of `message_id`, if any.
    async fn existing_record(&self, message_id: &str) -> Result<Option<GenerationRecord>> {
        let keys = self.store.list_keys().await?;
        let Some(key) = find_entry_key(&keys, message_id) else {
            return Ok(None);
        };
        match self.store.get_record(key).await {
            Ok(record) => Ok(record.filter(|r| r.message_id == message_id)),
            Err(e) => {
                tracing::warn!(message_id, key = %key, error = %e, "Ignoring unreadable earlier archive");
                Ok(None)
            }
        }
    }
}
