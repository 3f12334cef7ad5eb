//! Executing an `HttpRequest` over the network.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. `UreqTransport` is the
//! production implementation: synchronous, HTTP status codes returned as
//! data (a 404 is a response, not an error), and failures mapped onto
//! `TransportError`. There are no retries.

use std::io;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Sends one request and blocks until the full response has been read.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;

    /// `User-Agent` sent when the request does not set one.
    fn user_agent(&self) -> Option<&str> {
        None
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }

    fn user_agent(&self) -> Option<&str> {
        (**self).user_agent()
    }
}

/// `Transport` backed by a pooled `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(config.connect_timeout))
            .timeout_global(Some(config.timeout))
            .max_redirects(config.max_redirects)
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for UreqTransport {
    fn user_agent(&self) -> Option<&str> {
        Some(&self.user_agent)
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let has_user_agent = request.header("user-agent").is_some();
        let user_agent = (!has_user_agent).then_some(self.user_agent.as_str());
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), request, user_agent).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), request, user_agent).call(),
            HttpMethod::Head => with_headers(self.agent.head(url), request, user_agent).call(),
            HttpMethod::Options => with_headers(self.agent.options(url), request, user_agent).call(),
            HttpMethod::Post => send_body(with_headers(self.agent.post(url), request, user_agent), body),
            HttpMethod::Put => send_body(with_headers(self.agent.put(url), request, user_agent), body),
            HttpMethod::Patch => send_body(with_headers(self.agent.patch(url), request, user_agent), body),
        };

        let mut response = result.map_err(|e| map_error(e, url))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        // Invalid UTF-8 is replaced, not rejected.
        let bytes = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| map_error(e, url))?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
    user_agent: Option<&str>,
) -> ureq::RequestBuilder<B> {
    if let Some(user_agent) = user_agent {
        builder = builder.header("User-Agent", user_agent);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn map_error(error: ureq::Error, url: &str) -> TransportError {
    let url = url.to_string();
    let mapped = match error {
        ureq::Error::Timeout(_) => TransportError::Timeout { url },
        ureq::Error::HostNotFound => TransportError::HostNotFound { url },
        ureq::Error::BadUri(message) => TransportError::InvalidUrl { url, message },
        ureq::Error::Http(e) if url.parse::<ureq::http::Uri>().is_err() => TransportError::InvalidUrl {
            url,
            message: e.to_string(),
        },
        ureq::Error::ConnectionFailed => TransportError::ConnectionFailed {
            url,
            message: "connection failed".to_string(),
        },
        ureq::Error::Io(e) => match e.kind() {
            io::ErrorKind::ConnectionRefused => TransportError::ConnectionRefused { url },
            io::ErrorKind::TimedOut => TransportError::Timeout { url },
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                TransportError::ConnectionFailed {
                    url,
                    message: e.to_string(),
                }
            }
            _ => TransportError::Io {
                url,
                message: e.to_string(),
            },
        },
        other => TransportError::Other {
            url,
            message: other.to_string(),
        },
    };
    tracing::warn!(error = %mapped, "transport failure");
    mapped
}
