use thiserror::Error;

pub type Result<T> = std::result::Result<T, WaybackError>;

#[derive(Debug, Error)]
pub enum WaybackError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for WaybackError {
    fn from(err: reqwest::Error) -> Self {
        WaybackError::Network(err.to_string())
    }
}
