use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("service returned error (HTTP {status}) {code}: {message}")]
    ServiceError {
        status: u16,
        code: String,
        message: String,
    },

    #[error("failed to parse response: {0}")]
    ParseError(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("authentication failed")]
    AuthError,

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("too many requests, rate limited")]
    RateLimited,

    #[error("service unavailable, retry later")]
    ServiceUnavailable,
}

impl ApiError {
    /// True when the error is a 404 from the service, i.e. the addressed
    /// object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::ServiceError { status: 404, .. })
    }
}
