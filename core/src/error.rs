//! Error type for the facilities API client.
//!
//! # Design
//! Every failure leaving the client is an `ApiError`: transport failures,
//! non-2xx responses, undecodable bodies and malformed calls all carry the
//! same `message` / `status` / `data` triple. `ErrorKind` records which of
//! those paths produced the error so callers can branch without string
//! matching.

use serde_json::Value;
use thiserror::Error;

/// Message used when a failed response carries no `message` field.
pub const FALLBACK_MESSAGE: &str = "An error occurred";

/// Status reported for failures where no response was received.
pub const TRANSPORT_STATUS: u16 = 500;

/// Which stage of a call produced an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never completed (DNS, connection refused, I/O).
    Transport,
    /// The configured timeout elapsed before the response completed.
    Timeout,
    /// The server answered with a non-2xx status.
    Status,
    /// A 2xx response body could not be decoded into the expected type.
    Decode,
    /// The call was rejected before any I/O: bad path or unserializable body.
    Request,
}

/// The single error surfaced by `ApiClient` and the service adapters.
///
/// Fields are private; an `ApiError` is never mutated after construction.
#[derive(Debug, Clone, Error)]
#[error("{message} (HTTP {status})")]
pub struct ApiError {
    message: String,
    status: u16,
    data: Option<Value>,
    kind: ErrorKind,
}

impl ApiError {
    pub fn new(kind: ErrorKind, status: u16, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            message: message.into(),
            status,
            data,
            kind,
        }
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, TRANSPORT_STATUS, message, None)
    }

    pub(crate) fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, TRANSPORT_STATUS, message, None)
    }

    pub(crate) fn request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Request, TRANSPORT_STATUS, message, None)
    }

    pub(crate) fn decode(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, status, message, None)
    }

    /// Build the error for a non-2xx response from its raw body.
    ///
    /// `message` comes from the body's `message` string field when the body
    /// is JSON and has one; otherwise `FALLBACK_MESSAGE`. `data` is the
    /// parsed body, or `None` when the body is not JSON (including bodies
    /// that are not valid UTF-8).
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let data: Option<Value> = serde_json::from_slice(body).ok();
        let message = data
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_MESSAGE)
            .to_string();
        Self::new(ErrorKind::Status, status, message, data)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// True when the server answered with exactly `status`.
    pub fn is_status(&self, status: u16) -> bool {
        self.kind == ErrorKind::Status && self.status == status
    }
}
