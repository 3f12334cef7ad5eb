//! Error types for building, sending, and verifying calls.
//!
//! # Design
//! The three failure kinds stay distinct so a caller (or a test report) can
//! tell "the request was never sent" from "the network failed" from "the
//! server answered, but not as expected":
//!
//! - `ConfigError` is raised before any network activity.
//! - `TransportError` is a connection-level failure. It is never retried.
//! - `AssertionError` names the first unmet expectation with expected and
//!   actual values.
//!
//! `Error` wraps all three so `?` composes across build, send and verify.

use serde_json::Value;

use crate::content_type::ContentType;

/// Any failure produced by a `Client` round-trip.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Assertion(#[from] AssertionError),
}

impl Error {
    pub fn is_assertion(&self) -> bool {
        matches!(self, Error::Assertion(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// A request description or client configuration that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The URL template names a placeholder nobody supplied a value for.
    #[error("no value supplied for path parameter `{name}` in `{template}`")]
    MissingPathParam { name: String, template: String },

    /// Path parameters were supplied that match no placeholder.
    #[error("path parameters {names:?} do not appear in `{template}`")]
    UnusedPathParams { names: Vec<String>, template: String },

    /// An unclosed `{` or an empty `{}` in the URL template.
    #[error("malformed URL template `{template}`: {reason}")]
    MalformedTemplate { template: String, reason: String },

    /// A relative URL with no base URI to resolve it against.
    #[error("relative URL `{url}` requires a base URI")]
    RelativeUrl { url: String },

    /// An environment variable holds a value that cannot be parsed.
    #[error("invalid value `{value}` for {var}")]
    InvalidEnv { var: String, value: String },
}

/// A failure below the HTTP layer: nothing was received to assert on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not resolve host for {url}")]
    HostNotFound { url: String },

    #[error("connection refused by {url}")]
    ConnectionRefused { url: String },

    #[error("connection to {url} failed: {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("I/O error talking to {url}: {message}")]
    Io { url: String, message: String },

    #[error("transport error for {url}: {message}")]
    Other { url: String, message: String },
}

/// The first declared expectation the response did not meet.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssertionError {
    #[error("expected status code {expected} but was {actual}")]
    StatusCode { expected: u16, actual: u16 },

    #[error("expected content type {expected} but was {}", or_missing(.actual, "no Content-Type header"))]
    ContentType {
        expected: ContentType,
        actual: Option<String>,
    },

    #[error("expected header `{name}` to be `{expected}` but was {}", quoted_or_absent(.actual))]
    Header {
        name: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("JSON path `{path}`: expected {expected} but was {actual}")]
    BodyField {
        path: String,
        expected: Value,
        actual: Value,
    },

    #[error("JSON path `{path}`: expected {expected} but path not found")]
    PathNotFound { path: String, expected: Value },

    #[error("invalid JSON path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("JSON path `{path}`: body is not JSON ({reason})")]
    BodyNotJson { path: String, reason: String },
}

fn or_missing<'a>(actual: &'a Option<String>, missing: &'a str) -> &'a str {
    actual.as_deref().unwrap_or(missing)
}

fn quoted_or_absent(actual: &Option<String>) -> String {
    match actual {
        Some(value) => format!("`{value}`"),
        None => "absent".to_string(),
    }
}
