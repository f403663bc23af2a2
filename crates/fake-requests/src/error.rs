//! Error types shared across the crate.

use hyper::{Method, StatusCode, Uri};

/// Errors surfaced by dispatching, the client, and captured request decoding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No registered expectation matched and unexpected calls are not allowed.
    #[error("There was no response defined for the {method} request to \"{uri}\".")]
    UnhandledRequest {
        method: Method,
        /// Request path with the leading `/` stripped.
        path: String,
        uri: Uri,
    },
    #[error("Request to \"{uri}\" failed with status {status}")]
    Status { status: StatusCode, uri: Uri },
    #[error("No transport is configured to send the {method} request to \"{uri}\"")]
    NoTransport { method: Method, uri: Uri },
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(#[from] hyper::http::method::InvalidMethod),
    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] hyper::http::uri::InvalidUri),
    #[error("Invalid URI parts: {0}")]
    InvalidUriParts(#[from] hyper::http::uri::InvalidUriParts),
    #[error("Invalid status code: {0}")]
    InvalidStatus(#[from] hyper::http::status::InvalidStatusCode),
    #[error("Failed to build HTTP message: {0}")]
    Http(#[from] hyper::http::Error),
    #[error("Request body is not valid JSON: {0}")]
    InvalidJsonBody(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn unhandled(method: &Method, uri: &Uri) -> Self {
        Error::UnhandledRequest {
            method: method.clone(),
            path: uri.path().trim_start_matches('/').to_string(),
            uri: uri.clone(),
        }
    }

    /// True for the error raised when no expectation matched a request.
    pub fn is_unhandled_request(&self) -> bool {
        matches!(self, Error::UnhandledRequest { .. })
    }
}
