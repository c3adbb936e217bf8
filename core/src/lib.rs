//! Typed client for the Gen-API generation service.
//!
//! # Overview
//! Three remote operations are exposed as local calls: a liveness probe,
//! log-line creation and log-line validation. Callers never see HTTP
//! methods or paths, and status codes only as data on results and errors.
//!
//! # Design
//! - Each client keeps the `build_request` / `parse_response` split, so the
//!   status policy can be exercised without a network.
//! - `call` executes through a `Transport` (blocking `ureq` by default);
//!   `mock` answers from an injected `FixtureTable` and returns the same
//!   shapes, so callers cannot tell the two paths apart.
//! - Every failure is an `Error` carrying an `ErrorKind`, the observed
//!   status and its causes.
//! - Every call takes a `CallContext` for cancellation and deadlines.
//!
//! ```no_run
//! use std::sync::Arc;
//! use genapi_core::{CallContext, ClientConfig, FixtureTable, GenApi};
//!
//! let fixtures = Arc::new(FixtureTable::embedded().expect("bundled fixtures parse"));
//! let api = GenApi::new(&ClientConfig::new("http://localhost:3000"), fixtures);
//! let ctx = CallContext::background();
//!
//! match api.validate_log_line().call(&ctx, "The sea wrote back.") {
//!     Ok(_) => println!("valid"),
//!     Err(err) if err.is_invalid_log_line() => println!("rejected"),
//!     Err(err) => eprintln!("validation failed: {err}"),
//! }
//! ```

pub mod client;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod log_line;
pub mod ping;
pub mod response;

#[cfg(test)]
mod testing;

pub use client::{ClientConfig, GenApi};
pub use context::{CallContext, ContextError};
pub use error::{Cause, Error, ErrorKind};
pub use fixtures::{FixtureLoadError, FixtureTable};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError, UreqTransport};
pub use log_line::{CreateLogLineClient, GeneratedLogLine, ValidateLogLineClient};
pub use ping::PingClient;
pub use response::{ResponseError, StatusError};
