//! Declarative HTTP checks: describe a call, send it, verify the response.
//!
//! # Overview
//! A `Call` describes one request (method, URL template, path and query
//! parameters, headers, body) and may borrow a shared `RequestShape` for
//! defaults. `Client::send` resolves it into an `HttpRequest`, sends it
//! synchronously through a `Transport` and returns the `HttpResponse`.
//! `Expectation`s and reusable `ResponseExpectation`s then check the status
//! code, content type, headers, or JSON fields of that response.
//!
//! # Design
//! - Three error kinds stay separate: `ConfigError` (raised before any I/O),
//!   `TransportError` (connection-level, never retried) and `AssertionError`
//!   (first unmet expectation, with expected and actual values).
//! - Shapes and expectations are immutable once built and are shared by
//!   reference; every call produces a fresh request/response pair.
//! - Verbose request/response dumps go through `tracing` and never affect
//!   the outcome of a call.
//! - `cases::run_cases` runs a table of inputs with independent pass/fail
//!   per row.

pub mod call;
pub mod cases;
pub mod client;
pub mod config;
pub mod content_type;
pub mod error;
pub mod expect;
pub mod http;
pub mod log;
pub mod path;
pub mod shape;
pub mod telemetry;
pub mod template;
pub mod transport;

pub use call::Call;
pub use cases::{load_rows, run_cases, CaseReport};
pub use client::Client;
pub use config::ClientConfig;
pub use content_type::ContentType;
pub use error::{AssertionError, ConfigError, Error, TransportError};
pub use expect::{Expectation, ResponseExpectation};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use log::{LogConfig, LogMode};
pub use shape::RequestShape;
pub use transport::{Transport, UreqTransport};
