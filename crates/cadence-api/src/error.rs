use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx from the gateway. `message` is what the user gets to read.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("login response did not include a token and user id")]
    IncompleteLogin,

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("you must be logged in")]
    NotAuthenticated,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
