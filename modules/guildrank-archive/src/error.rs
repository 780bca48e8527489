/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] wayback_client::WaybackError),

    #[error("Browser error: {0}")]
    Browser(#[from] browserless_client::BrowserlessError),

    #[error("Cache I/O failed for {key}: {source}")]
    Cache {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected content: {0}")]
    Parse(String),
}
