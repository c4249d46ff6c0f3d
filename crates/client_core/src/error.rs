use shared::{
    error::{ApiError, ErrorCode},
    protocol::DecodeError,
};
use thiserror::Error;

/// Failure of a single endpoint request. These never leave the acquisition
/// layer as errors; they are converted into fallback data plus an
/// [`ApiError`] diagnostic.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("endpoint not configured")]
    NotConfigured,
    #[error("Request timeout - API is taking too long to respond")]
    Timeout,
    #[error("Network error - Unable to reach the API server ({0})")]
    Network(String),
    #[error("API Error: {status} - {reason}")]
    Status { status: u16, reason: String },
    #[error("API returned invalid data format - {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotConfigured => ErrorCode::NotConfigured,
            Self::Timeout => ErrorCode::Timeout,
            Self::Network(_) => ErrorCode::Network,
            Self::Status { .. } => ErrorCode::HttpStatus,
            Self::Malformed(_) => ErrorCode::Malformed,
        }
    }

    /// A missing endpoint or a body of the wrong shape will not change
    /// between attempts.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotConfigured | Self::Malformed(_))
    }

    pub fn to_api_error(&self) -> ApiError {
        ApiError::new(self.code(), self.to_string())
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<DecodeError> for FetchError {
    fn from(value: DecodeError) -> Self {
        Self::Malformed(value.to_string())
    }
}
