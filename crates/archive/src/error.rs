/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    /// A key or id that would escape the output root.
    #[error("Invalid archive key: {0}")]
    InvalidKey(String),
}
