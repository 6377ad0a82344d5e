use thiserror::Error;

/// Errors returned by the clusto client library
#[derive(Error, Debug)]
pub enum ClustoError {
    /// A name lookup returned 404
    #[error("{0} does not exist!")]
    NotFound(String),

    /// The service answered with an unexpected status; `body` is the raw response
    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Too many values for attr_value: {0}")]
    Ambiguous(usize),

    #[error("No private IP address found for {0}")]
    NoPrivateIp(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClustoError {
    /// Build a `RequestFailed` from a status code and raw body
    pub fn request_failed(status: u16, body: impl Into<String>) -> Self {
        ClustoError::RequestFailed {
            status,
            body: body.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClustoError::NotFound(_))
    }
}

pub type Result<T, E = ClustoError> = std::result::Result<T, E>;
