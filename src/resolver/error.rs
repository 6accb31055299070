use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("request error: {0}")]
    Request(reqwest::Error),
    #[error("service responded with status {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("invalid response payload: {0}")]
    InvalidPayload(String),
}

impl ResolveError {
    /// The request URL carries the API key, so it never becomes part of the error.
    pub fn from_request(e: reqwest::Error) -> Self {
        ResolveError::Request(e.without_url())
    }

    /// Only failures to reach the service are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ResolveError::Request(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
