use std::sync::Arc;

use novagen_archive::{ArchiveIndex, ArchiveWriter, EntryStore, FsEntryStore, HttpImageFetcher};
use novagen_client::api::ImagineApi;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Client for the remote generation service.
    pub api: Arc<ImagineApi>,
    /// Materializes completed jobs into the output directory.
    pub writer: ArchiveWriter,
    /// Lists and deletes archived generations.
    pub index: ArchiveIndex,
}

impl AppState {
    /// Wire the remote client and the directory-backed archive from
    /// configuration. The API client and the image downloader share one
    /// connection pool.
    pub fn new(config: ServerConfig) -> Self {
        let client = reqwest::Client::new();
        let generation = &config.generation;

        let store: Arc<dyn EntryStore> = Arc::new(FsEntryStore::new(generation.output_dir.clone()));
        let fetcher = Arc::new(HttpImageFetcher::with_client(
            client.clone(),
            generation.request_timeout,
        ));
        let api = Arc::new(ImagineApi::with_client(client, generation.clone()));

        Self {
            writer: ArchiveWriter::new(Arc::clone(&store), fetcher),
            index: ArchiveIndex::new(store),
            api,
            config: Arc::new(config),
        }
    }
}
