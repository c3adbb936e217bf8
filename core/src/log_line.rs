//! Log-line creation and validation.
//!
//! # Design
//! Both clients share one resource path and differ by method: PUT creates
//! a line from instructions, POST validates a candidate line. Each offers
//! `call`, which goes over the network, and `mock`, which answers from the
//! injected fixture table. Both return the same shapes, so callers do not
//! care which one ran.
//!
//! `mock` looks only at the use-case name; instructions and candidate
//! lines play no part in mocked responses.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::CallContext;
use crate::endpoint::join_path;
use crate::error::{Error, ErrorKind};
use crate::fixtures::{normalize_use_case, FixtureTable};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::response::extract_json;

pub const LOG_LINES_PATH: &str = "/api/v1/log-lines";

const STATUS_OK: u16 = 200;
const STATUS_NO_CONTENT: u16 = 204;
const STATUS_UNPROCESSABLE_ENTITY: u16 = 422;

#[derive(Debug, Serialize)]
struct CreateLogLineBody<'a> {
    instruction: &'a str,
    remix: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateLogLineReply {
    log_line: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateLogLineBody<'a> {
    log_line: &'a str,
}

/// A log line produced by Gen-API, with the status it came back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLogLine {
    pub log_line: String,
    pub status: u16,
}

fn json_request(method: HttpMethod, endpoint: &str, body: &impl Serialize) -> Result<HttpRequest, Error> {
    let url = join_path(endpoint, LOG_LINES_PATH).map_err(Error::invalid_endpoint)?;
    let body = serde_json::to_string(body).map_err(Error::encode)?;
    Ok(HttpRequest {
        method,
        url,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

/// Generates a log line from instructions and a remix history.
#[derive(Debug, Clone)]
pub struct CreateLogLineClient {
    endpoint: String,
    transport: Arc<dyn Transport>,
    fixtures: Arc<FixtureTable>,
}

impl CreateLogLineClient {
    pub fn new(endpoint: &str, fixtures: Arc<FixtureTable>) -> Self {
        Self::with_transport(endpoint, Arc::new(UreqTransport::new()), fixtures)
    }

    pub fn with_transport(
        endpoint: &str,
        transport: Arc<dyn Transport>,
        fixtures: Arc<FixtureTable>,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            transport,
            fixtures,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_request(&self, instruction: &str, remix: &[String]) -> Result<HttpRequest, Error> {
        json_request(
            HttpMethod::Put,
            &self.endpoint,
            &CreateLogLineBody { instruction, remix },
        )
    }

    pub fn parse_response(&self, response: &HttpResponse) -> Result<GeneratedLogLine, Error> {
        if let Some(err) = Error::check_status(response, STATUS_OK) {
            return Err(err);
        }
        let reply: CreateLogLineReply =
            extract_json(response).map_err(|err| Error::decode(response.status, err))?;
        Ok(GeneratedLogLine {
            log_line: reply.log_line,
            status: response.status,
        })
    }

    pub fn call(
        &self,
        ctx: &CallContext,
        instruction: &str,
        remix: &[String],
    ) -> Result<GeneratedLogLine, Error> {
        let request = self.build_request(instruction, remix)?;
        let response = self
            .transport
            .execute(ctx, &request)
            .map_err(Error::transport)?;
        self.parse_response(&response)
    }

    /// Serve the fixture declared for `use_case` (empty means "success").
    pub fn mock(&self, _ctx: &CallContext, use_case: &str) -> Result<GeneratedLogLine, Error> {
        let use_case = normalize_use_case(use_case);
        let fixture = self
            .fixtures
            .create(use_case)
            .ok_or_else(|| Error::unknown_use_case(use_case))?;
        tracing::trace!(use_case, status = fixture.status, "serving mocked log-line creation");
        match &fixture.err {
            Some(err) => Err(err.to_error(fixture.status)),
            None => Ok(GeneratedLogLine {
                log_line: fixture.result.clone(),
                status: fixture.status,
            }),
        }
    }
}

/// Checks whether a candidate line is acceptable to Gen-API.
#[derive(Debug, Clone)]
pub struct ValidateLogLineClient {
    endpoint: String,
    transport: Arc<dyn Transport>,
    fixtures: Arc<FixtureTable>,
}

impl ValidateLogLineClient {
    pub fn new(endpoint: &str, fixtures: Arc<FixtureTable>) -> Self {
        Self::with_transport(endpoint, Arc::new(UreqTransport::new()), fixtures)
    }

    pub fn with_transport(
        endpoint: &str,
        transport: Arc<dyn Transport>,
        fixtures: Arc<FixtureTable>,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            transport,
            fixtures,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_request(&self, log_line: &str) -> Result<HttpRequest, Error> {
        json_request(
            HttpMethod::Post,
            &self.endpoint,
            &ValidateLogLineBody { log_line },
        )
    }

    /// 422 is the expected rejection and is checked before anything else;
    /// the body of a 204 is ignored.
    pub fn parse_response(&self, response: &HttpResponse) -> Result<u16, Error> {
        if response.status == STATUS_UNPROCESSABLE_ENTITY {
            return Err(Error::new(ErrorKind::InvalidLogLine, response.status));
        }
        if let Some(err) = Error::check_status(response, STATUS_NO_CONTENT) {
            return Err(err);
        }
        Ok(response.status)
    }

    pub fn call(&self, ctx: &CallContext, log_line: &str) -> Result<u16, Error> {
        let request = self.build_request(log_line)?;
        let response = self
            .transport
            .execute(ctx, &request)
            .map_err(Error::transport)?;
        self.parse_response(&response)
    }

    /// Serve the fixture declared for `use_case` (empty means "success").
    pub fn mock(&self, _ctx: &CallContext, use_case: &str) -> Result<u16, Error> {
        let use_case = normalize_use_case(use_case);
        let fixture = self
            .fixtures
            .validate(use_case)
            .ok_or_else(|| Error::unknown_use_case(use_case))?;
        tracing::trace!(use_case, status = fixture.status, "serving mocked log-line validation");
        match &fixture.err {
            Some(err) => Err(err.to_error(fixture.status)),
            None => Ok(fixture.status),
        }
    }
}
