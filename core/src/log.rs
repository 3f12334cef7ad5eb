//! Verbose request/response dumps.
//!
//! Dumps are human-readable text emitted as `tracing` events on the
//! `apicheck::log` target. Rendering only reads the request or response.

use serde::{Deserialize, Serialize};

use crate::http::{HttpRequest, HttpResponse};

pub const TARGET: &str = "apicheck::log";

/// When to dump one side of the exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogMode {
    #[default]
    Off,
    Always,
    /// Only when `send_and_verify` fails an expectation.
    IfValidationFails,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub request: LogMode,
    pub response: LogMode,
}

impl LogConfig {
    pub const fn off() -> Self {
        Self {
            request: LogMode::Off,
            response: LogMode::Off,
        }
    }

    pub const fn all() -> Self {
        Self {
            request: LogMode::Always,
            response: LogMode::Always,
        }
    }

    pub const fn requests() -> Self {
        Self {
            request: LogMode::Always,
            response: LogMode::Off,
        }
    }

    pub const fn responses() -> Self {
        Self {
            request: LogMode::Off,
            response: LogMode::Always,
        }
    }

    pub const fn if_validation_fails() -> Self {
        Self {
            request: LogMode::IfValidationFails,
            response: LogMode::IfValidationFails,
        }
    }

    /// Parse the `APICHECK_LOG` vocabulary.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "off" | "none" => Some(Self::off()),
            "request" | "requests" => Some(Self::requests()),
            "response" | "responses" => Some(Self::responses()),
            "all" => Some(Self::all()),
            "on-failure" | "if-validation-fails" => Some(Self::if_validation_fails()),
            _ => None,
        }
    }
}

pub fn render_request(request: &HttpRequest) -> String {
    let mut out = String::new();
    out.push_str(&format!("Request method:\t{}\n", request.method));
    out.push_str(&format!("Request URI:\t{}\n", request.url));
    push_headers(&mut out, &request.headers);
    out.push_str("Body:\n");
    match &request.body {
        Some(body) => out.push_str(&pretty_body(body)),
        None => out.push_str("<none>"),
    }
    out
}

pub fn render_response(response: &HttpResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!("Status:\t\t{}\n", response.status));
    push_headers(&mut out, &response.headers);
    out.push('\n');
    out.push_str(&pretty_body(&response.body));
    out
}

pub fn log_request(request: &HttpRequest) {
    tracing::info!(target: TARGET, "\n{}", render_request(request));
}

pub fn log_response(response: &HttpResponse) {
    tracing::info!(target: TARGET, "\n{}", render_response(response));
}

fn push_headers(out: &mut String, headers: &[(String, String)]) {
    if headers.is_empty() {
        out.push_str("Headers:\t<none>\n");
        return;
    }
    for (i, (name, value)) in headers.iter().enumerate() {
        let label = if i == 0 { "Headers:" } else { "" };
        out.push_str(&format!("{label}\t\t{name}={value}\n"));
    }
}

/// Pretty-print JSON bodies; anything else is returned verbatim.
fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or_else(|| body.to_string())
}
