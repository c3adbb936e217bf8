//! HTTP transport types and the blocking transport used for live calls.
//!
//! # Design
//! Requests and responses are plain data. Clients build an `HttpRequest`,
//! hand it to a `Transport`, and classify the returned `HttpResponse`
//! themselves, so status policy never leaks into the transport. Non-2xx
//! statuses are data, not transport errors.
//!
//! `UreqTransport` is the production implementation. Tests and embedding
//! applications may supply their own `Transport`.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::context::{CallContext, ContextError};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Failure to obtain any response at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Interrupted(#[from] ContextError),

    #[error(transparent)]
    Http(#[from] ureq::Error),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// The context interruption behind this failure, if any.
    pub fn interruption(&self) -> Option<ContextError> {
        match self {
            TransportError::Interrupted(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Executes one request and returns whatever response the server sent.
pub trait Transport: fmt::Debug + Send + Sync {
    fn execute(&self, ctx: &CallContext, request: &HttpRequest)
        -> Result<HttpResponse, TransportError>;
}

/// How often a waiting call re-checks its context.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Blocking transport backed by `ureq`.
///
/// One agent is built up front and shared by every request, so clients
/// holding the same transport reuse its connections. Each request gets the
/// tighter of the configured timeout and the time left on the caller's
/// deadline.
///
/// The exchange itself runs on a worker thread while the calling thread
/// watches the context. A cancelled or expired context returns at once;
/// the abandoned exchange finishes on its own and its outcome is dropped.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Option<Duration>,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent, timeout }
    }

    fn effective_timeout(&self, ctx: &CallContext) -> Option<Duration> {
        match (self.timeout, ctx.remaining()) {
            (Some(configured), Some(remaining)) => Some(configured.min(remaining)),
            (configured, remaining) => configured.or(remaining),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        ctx: &CallContext,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        ctx.check()?;

        let agent = self.agent.clone();
        let timeout = self.effective_timeout(ctx);
        let owned = request.clone();
        let (tx, rx) = mpsc::channel();

        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        thread::Builder::new()
            .name("genapi-http".to_string())
            .spawn(move || {
                // The receiver is gone when the caller gave up.
                let _ = tx.send(exchange(&agent, timeout, &owned));
            })
            .map_err(|err| TransportError::Other(format!("failed to start request: {err}")))?;

        let outcome = loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(outcome) => break outcome,
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(reason) = ctx.check() {
                        tracing::debug!(%reason, url = %request.url, "abandoning request");
                        return Err(reason.into());
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(TransportError::Other(
                        "request worker exited without a result".to_string(),
                    ));
                }
            }
        };

        // An interruption racing the response wins, and a timeout caused by
        // the caller's deadline is reported as such.
        ctx.check()?;
        let response = outcome?;

        tracing::debug!(status = response.status, url = %request.url, "received response");
        Ok(response)
    }
}

/// Send one request and read the whole response.
fn exchange(
    agent: &ureq::Agent,
    timeout: Option<Duration>,
    request: &HttpRequest,
) -> Result<HttpResponse, ureq::Error> {
    let url = request.url.as_str();
    let mut response = match (request.method, request.body.as_deref()) {
        (HttpMethod::Get, _) => {
            let mut builder = agent.get(url).config().timeout_global(timeout).build();
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()?
        }
        (method, body) => {
            let builder = match method {
                HttpMethod::Put => agent.put(url),
                _ => agent.post(url),
            };
            let mut builder = builder.config().timeout_global(timeout).build();
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match body {
                Some(body) => builder.send(body.as_bytes())?,
                None => builder.send_empty()?,
            }
        }
    };

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let body = response.body_mut().read_to_string()?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
