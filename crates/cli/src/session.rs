use std::sync::Arc;

use anyhow::{Context, Result};

use novagen_archive::{ArchiveIndex, ArchiveWriter, EntryStore, FsEntryStore, HttpImageFetcher};
use novagen_client::api::ImagineApi;
use novagen_client::poller::PollConfig;
use novagen_core::config::GenerationConfig;

/// Everything a command needs, built once per invocation.
pub struct Session {
    pub api: ImagineApi,
    pub writer: ArchiveWriter,
    pub index: ArchiveIndex,
    pub poll: PollConfig,
    pub max_prompt_length: usize,
}

impl Session {
    /// Wire the client and archive and make sure the output root exists.
    pub async fn new(config: GenerationConfig, poll: PollConfig) -> Result<Self> {
        let fs_store = FsEntryStore::new(config.output_dir.clone());
        fs_store.init().await.with_context(|| {
            format!("Failed to create output directory {}", fs_store.root().display())
        })?;
        let store: Arc<dyn EntryStore> = Arc::new(fs_store);

        let fetcher = Arc::new(HttpImageFetcher::new(config.request_timeout));

        Ok(Self {
            writer: ArchiveWriter::new(Arc::clone(&store), fetcher),
            index: ArchiveIndex::new(store),
            max_prompt_length: config.max_prompt_length,
            api: ImagineApi::new(config),
            poll,
        })
    }
}
