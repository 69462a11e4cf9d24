use thiserror::Error;

/// Failure talking to the shop backend
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{status} {reason}")]
    Status { status: u16, reason: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("image too large ({size} bytes, limit {limit})")]
    ImageTooLarge { size: u64, limit: u64 },

    #[error("admin password rejected")]
    Unauthorized,

    #[error("invalid backend url: {0}")]
    Url(String),
}

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}
