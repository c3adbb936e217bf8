//! Liveness probe against Gen-API.
//!
//! # Design
//! Liveness has no `mock`: it is cheap and exists to report real service
//! health. A probe that gets no response at all means the service is
//! unavailable; a response other than 200 means it is up but degraded.

use std::sync::Arc;

use crate::context::CallContext;
use crate::endpoint::join_path;
use crate::error::{Error, ErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::response::ensure_status;

pub const PING_PATH: &str = "/ping";

const STATUS_OK: u16 = 200;

#[derive(Debug, Clone)]
pub struct PingClient {
    endpoint: String,
    transport: Arc<dyn Transport>,
}

impl PingClient {
    pub fn new(endpoint: &str) -> Self {
        Self::with_transport(endpoint, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(endpoint: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_request(&self) -> Result<HttpRequest, Error> {
        let url = join_path(&self.endpoint, PING_PATH).map_err(Error::invalid_endpoint)?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        })
    }

    /// Anything but 200 is a degraded service. The body is not inspected.
    pub fn parse_response(&self, response: &HttpResponse) -> Result<u16, Error> {
        ensure_status(response, STATUS_OK).map_err(|mismatch| {
            Error::new(ErrorKind::UnexpectedStatus, response.status).with_cause(mismatch)
        })?;
        Ok(response.status)
    }

    /// Probe the service. Returns the response status, 200 on success.
    pub fn call(&self, ctx: &CallContext) -> Result<u16, Error> {
        let request = self.build_request()?;
        let response = self
            .transport
            .execute(ctx, &request)
            .map_err(Error::unavailable)?;
        self.parse_response(&response)
    }
}
