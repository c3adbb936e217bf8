//! Error type shared by every Gen-API client.
//!
//! # Design
//! An `Error` is a kind, the HTTP status observed (0 when no response was
//! received), and the ordered causes that produced it. Callers branch on
//! `kind()`; the causes keep the classifier error and the server's own
//! error payload side by side instead of flattening them into a string.
//!
//! `InvalidLogLine` is an expected business outcome and gets its own kind
//! so callers never have to compare status codes. `UnknownUseCase` is the
//! only kind a fixture cannot declare.

use std::fmt;

use thiserror::Error;

use crate::context::ContextError;
use crate::http::{HttpResponse, TransportError};
use crate::response::{ensure_status, response_error, ResponseError, StatusError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The endpoint could not be joined with the operation path.
    InvalidEndpoint,
    /// The request body could not be serialized.
    Encode,
    /// No response was received.
    Transport,
    /// The liveness probe got no response at all.
    Unavailable,
    Cancelled,
    DeadlineExceeded,
    /// A response arrived with a status other than the expected one.
    UnexpectedStatus,
    /// A success response carried a body of the wrong shape.
    Decode,
    /// Gen-API rejected the candidate log line (HTTP 422).
    InvalidLogLine,
    /// `mock` was asked for a use case the fixture table does not declare.
    UnknownUseCase,
    /// A fixture-declared failure with no more specific kind.
    Mocked,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidEndpoint => "invalid endpoint",
            ErrorKind::Encode => "failed to encode request body",
            ErrorKind::Transport => "transport error",
            ErrorKind::Unavailable => "service unavailable",
            ErrorKind::Cancelled => "call cancelled",
            ErrorKind::DeadlineExceeded => "deadline exceeded",
            ErrorKind::UnexpectedStatus => "unexpected response status",
            ErrorKind::Decode => "failed to decode response body",
            ErrorKind::InvalidLogLine => "invalid log line",
            ErrorKind::UnknownUseCase => "unknown use case",
            ErrorKind::Mocked => "mocked error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One underlying reason attached to an `Error`.
#[derive(Debug, Error)]
pub enum Cause {
    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("{0}")]
    Message(String),
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    status: u16,
    causes: Vec<Cause>,
}

impl Error {
    pub fn new(kind: ErrorKind, status: u16) -> Self {
        Self {
            kind,
            status,
            causes: Vec::new(),
        }
    }

    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.causes.push(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status observed, or 0 when the call never got a response.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn causes(&self) -> &[Cause] {
        &self.causes
    }

    pub fn is_invalid_log_line(&self) -> bool {
        self.kind == ErrorKind::InvalidLogLine
    }

    /// The structured payload the server sent with a failure, if any.
    pub fn response_error(&self) -> Option<&ResponseError> {
        self.causes.iter().find_map(|cause| match cause {
            Cause::Response(err) => Some(err),
            _ => None,
        })
    }

    pub(crate) fn invalid_endpoint(err: url::ParseError) -> Self {
        Self::new(ErrorKind::InvalidEndpoint, 0).with_cause(err)
    }

    pub(crate) fn encode(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Encode, 0).with_cause(err)
    }

    pub(crate) fn unknown_use_case(use_case: &str) -> Self {
        Self::new(ErrorKind::UnknownUseCase, 0).with_cause(Cause::Message(use_case.to_string()))
    }

    pub(crate) fn decode(status: u16, err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Decode, status).with_cause(err)
    }

    /// A transport failure surfaced as-is, except that context
    /// interruptions keep their own kind.
    pub(crate) fn transport(err: TransportError) -> Self {
        Self::from_transport(ErrorKind::Transport, err)
    }

    /// A transport failure on the liveness probe.
    pub(crate) fn unavailable(err: TransportError) -> Self {
        Self::from_transport(ErrorKind::Unavailable, err)
    }

    fn from_transport(kind: ErrorKind, err: TransportError) -> Self {
        match err.interruption() {
            Some(ContextError::Cancelled) => Self::new(ErrorKind::Cancelled, 0),
            Some(ContextError::DeadlineExceeded) => Self::new(ErrorKind::DeadlineExceeded, 0),
            None => Self::new(kind, 0).with_cause(err),
        }
    }

    /// Classify a response whose status is not `expected`. Returns `None`
    /// when the status matches.
    pub(crate) fn check_status(response: &HttpResponse, expected: u16) -> Option<Self> {
        let mismatch = ensure_status(response, expected).err()?;
        let mut err = Self::new(ErrorKind::UnexpectedStatus, response.status).with_cause(mismatch);
        if let Some(payload) = response_error(response) {
            err = err.with_cause(payload);
        }
        Some(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for (i, cause) in self.causes.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes
            .first()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
