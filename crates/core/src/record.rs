//! The durable metadata record written for each archive entry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contents of `metadata.json`.
///
/// `images` and `original_urls` are both in remote order, but `images`
/// only lists downloads that succeeded, so the two are aligned by
/// position only when every download succeeded. `image_count` always
/// equals `images.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub message_id: String,
    /// `YYYYMMDD_HHMMSS`, taken when the images were downloaded.
    pub timestamp: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub image_count: usize,
    /// Served paths (`/output/{key}/{file}`) of locally saved images.
    #[serde(default)]
    pub images: Vec<String>,
    /// Remote URLs exactly as the service returned them.
    #[serde(default)]
    pub original_urls: Vec<String>,
    /// Follow-up action buttons advertised by the remote response.
    #[serde(default)]
    pub buttons: Vec<Value>,
    /// Full fetch response, kept for auditing.
    #[serde(default)]
    pub raw_response: Value,
}

impl GenerationRecord {
    /// Build a record, deriving `image_count` from `images`.
    pub fn new(
        message_id: impl Into<String>,
        timestamp: impl Into<String>,
        prompt: impl Into<String>,
        images: Vec<String>,
        original_urls: Vec<String>,
        raw_response: Value,
    ) -> Self {
        let buttons = crate::normalize::extract_buttons(&raw_response);
        Self {
            message_id: message_id.into(),
            timestamp: timestamp.into(),
            prompt: prompt.into(),
            image_count: images.len(),
            images,
            original_urls,
            buttons,
            raw_response,
        }
    }
}

/// One archived image, flattened out of its record for gallery views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub url: String,
    pub timestamp: String,
    pub prompt: String,
    pub message_id: String,
}

/// Flatten records into gallery images, preserving record order and the
/// image order within each record.
pub fn gallery_images(records: &[GenerationRecord]) -> Vec<GalleryImage> {
    records
        .iter()
        .flat_map(|record| {
            record.images.iter().map(move |url| GalleryImage {
                url: url.clone(),
                timestamp: record.timestamp.clone(),
                prompt: record.prompt.clone(),
                message_id: record.message_id.clone(),
            })
        })
        .collect()
}
