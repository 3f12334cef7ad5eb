//! Build, send, verify.
//!
//! # Design
//! `Client` owns a `Transport` and a `LogConfig` and nothing else. Each call
//! is a linear sequence: resolve the `Call` into an `HttpRequest`, send it,
//! and optionally verify a `ResponseExpectation`. No state survives between
//! calls, so one client can serve every test in a suite.

use crate::call::Call;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::expect::ResponseExpectation;
use crate::http::{HttpRequest, HttpResponse};
use crate::log::{self, LogConfig, LogMode};
use crate::transport::{Transport, UreqTransport};

#[derive(Debug, Clone)]
pub struct Client<T = UreqTransport> {
    transport: T,
    log: LogConfig,
}

impl Client<UreqTransport> {
    /// A client with the default transport configuration and logging off.
    pub fn new() -> Self {
        Self::with_config(&ClientConfig::default())
    }

    pub fn with_config(config: &ClientConfig) -> Self {
        Self {
            transport: UreqTransport::new(config),
            log: config.log,
        }
    }
}

impl Default for Client<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T, log: LogConfig) -> Self {
        Self { transport, log }
    }

    pub fn log_config(&self) -> LogConfig {
        self.log
    }

    /// Same transport, different logging.
    pub fn logging(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Resolve and send `call`, returning whatever status the server chose.
    pub fn send(&self, call: &Call<'_>) -> Result<HttpResponse, Error> {
        let request = self.resolve(call)?;
        self.exchange(&request)
    }

    /// Send `call` and check `expectation` against the response.
    ///
    /// Sides configured with `LogMode::IfValidationFails` are dumped only
    /// when verification fails.
    pub fn send_and_verify(
        &self,
        call: &Call<'_>,
        expectation: &ResponseExpectation,
    ) -> Result<HttpResponse, Error> {
        let request = self.resolve(call)?;
        let response = self.exchange(&request)?;
        if let Err(failure) = expectation.verify(&response) {
            tracing::debug!(url = %request.url, %failure, "expectation not met");
            if self.log.request == LogMode::IfValidationFails {
                log::log_request(&request);
            }
            if self.log.response == LogMode::IfValidationFails {
                log::log_response(&response);
            }
            return Err(failure.into());
        }
        Ok(response)
    }

    /// Build `call` and add the headers the transport would otherwise add on
    /// its own, so the logged request is the one on the wire.
    fn resolve(&self, call: &Call<'_>) -> Result<HttpRequest, Error> {
        let mut request = call.build()?;
        if let Some(user_agent) = self.transport.user_agent() {
            if request.header("user-agent").is_none() {
                request
                    .headers
                    .push(("User-Agent".to_string(), user_agent.to_string()));
            }
        }
        Ok(request)
    }

    fn exchange(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        if self.log.request == LogMode::Always {
            log::log_request(request);
        }
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(request)?;
        tracing::debug!(status = response.status, url = %request.url, "received response");
        if self.log.response == LogMode::Always {
            log::log_response(&response);
        }
        Ok(response)
    }
}
