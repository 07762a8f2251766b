//! Errors returned by `TodoClient` parse and build methods.
//!
//! 400, 404 and 405 get dedicated variants since the server uses each for one
//! well-defined condition. Any other unexpected status lands in `HttpError`
//! with the raw body for debugging.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned 400: bad id or invalid payload.
    #[error("bad request: {body}")]
    BadRequest { body: String },

    /// The server returned 405.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Any other status that was not the expected success code.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}
