//! Failures of a single call to the remote translation endpoint

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("request to translation endpoint failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("translation endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed endpoint response: {0}")]
    Malformed(String),

    #[error("request cancelled")]
    Cancelled,
}

pub type EndpointResult<T> = Result<T, EndpointError>;
