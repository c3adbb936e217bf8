//! One entry point for the three Gen-API clients.
//!
//! # Design
//! `GenApi` is meant for the embedding application's composition root: it
//! is built once from a `ClientConfig` and an already-loaded fixture table,
//! and every client it hands out shares the same transport and fixtures.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::fixtures::FixtureTable;
use crate::http::{Transport, UreqTransport};
use crate::log_line::{CreateLogLineClient, ValidateLogLineClient};
use crate::ping::PingClient;

/// Connection settings, typically a section of the gateway's own config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Root URL of the Gen-API service.
    pub endpoint: String,
    /// Upper bound on a single request, in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            timeout_ms: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone)]
pub struct GenApi {
    ping: PingClient,
    create_log_line: CreateLogLineClient,
    validate_log_line: ValidateLogLineClient,
}

impl GenApi {
    pub fn new(config: &ClientConfig, fixtures: Arc<FixtureTable>) -> Self {
        let transport = Arc::new(UreqTransport::with_timeout(config.timeout()));
        Self::with_transport(config, transport, fixtures)
    }

    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        fixtures: Arc<FixtureTable>,
    ) -> Self {
        tracing::debug!(endpoint = %config.endpoint, timeout_ms = ?config.timeout_ms, "configuring Gen-API clients");
        Self {
            ping: PingClient::with_transport(&config.endpoint, transport.clone()),
            create_log_line: CreateLogLineClient::with_transport(
                &config.endpoint,
                transport.clone(),
                fixtures.clone(),
            ),
            validate_log_line: ValidateLogLineClient::with_transport(
                &config.endpoint,
                transport,
                fixtures,
            ),
        }
    }

    pub fn ping(&self) -> &PingClient {
        &self.ping
    }

    pub fn create_log_line(&self) -> &CreateLogLineClient {
        &self.create_log_line
    }

    pub fn validate_log_line(&self) -> &ValidateLogLineClient {
        &self.validate_log_line
    }
}
