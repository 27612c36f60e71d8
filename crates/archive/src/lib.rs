//! File-based archive of completed generations.
//!
//! Each completed job gets one directory under the output root holding its
//! downloaded images and a `metadata.json` record. There is no separate
//! index: listing the output root *is* the index. Storage access goes
//! through the [`EntryStore`](store::EntryStore) trait so the directory
//! scan can be swapped for a real index without touching callers.

pub mod error;
pub mod fetcher;
pub mod index;
pub mod store;
pub mod writer;

pub use error::{ArchiveError, Result};
pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use index::ArchiveIndex;
pub use store::{EntryStore, FsEntryStore};
pub use writer::ArchiveWriter;
