use reqwest::StatusCode;

/// Failure of a single Webex API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The access token was missing, expired or revoked.
    #[error("the access token was rejected by Webex (401 Unauthorized)")]
    Unauthorized,

    #[error("request failed with {status}: {message}")]
    Status {
        status: StatusCode,
        message: String,
        tracking_id: Option<String>,
    },

    #[error("still rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("connection error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response doesn't match the expected JSON schema: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL {0}")]
    InvalidUrl(String),

    #[error("the access token contains characters that are not allowed in an HTTP header")]
    InvalidToken,
}

impl ApiError {
    /// Whether this error means every further call will fail too.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::InvalidToken)
    }
}
