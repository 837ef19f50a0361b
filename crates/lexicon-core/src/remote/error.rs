use thiserror::Error;

/// Errors that can occur while talking to the remote taxonomy service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Term already exists: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl RemoteError {
    /// Failures worth retrying later; conflicts and lookups are final.
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Network(_))
            || matches!(self, RemoteError::Api { status, .. } if *status >= 500)
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}
