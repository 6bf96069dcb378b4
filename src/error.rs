//! Relay error taxonomy.
//!
//! Validation failures render as fixed plain-text responses. Upstream
//! failures are not retried or translated into a fallback payload.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Methods advertised by the relay.
pub const ALLOWED_METHODS: &str = "GET,HEAD,OPTIONS";

#[derive(Debug, Error)]
pub enum RelayError {
    /// Target is not an absolute http(s) URL.
    #[error("Invalid target")]
    InvalidTarget,

    /// Target hostname is outside the allow-list.
    #[error("Target host not allowed")]
    HostNotAllowed,

    /// A required query parameter did not survive filtering.
    #[error("Missing {0}")]
    MissingParameter(&'static str),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The upstream could not be reached.
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidTarget | RelayError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            RelayError::HostNotAllowed => StatusCode::FORBIDDEN,
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_string();
        match self {
            RelayError::Upstream(e) => {
                tracing::error!(error = %e, "Upstream error");
                (status, "Upstream request failed").into_response()
            }
            RelayError::MethodNotAllowed => {
                let mut response = (status, body).into_response();
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
                response
            }
            _ => (status, body).into_response(),
        }
    }
}
