//! Fake Gen-API server for integration tests and local development.
//!
//! Implements the Gen-API wire contract with deterministic, input-driven
//! behavior: a few magic instructions and log lines trigger the failure
//! paths a real deployment produces.

use std::{sync::Arc, time::Duration};

pub use axum::http::StatusCode;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Instruction that makes creation fail with 500.
pub const FAIL_INSTRUCTION: &str = "fail";
/// Instruction or log line that makes the server wait `Behavior::slow_delay`
/// before answering.
pub const SLOW_INSTRUCTION: &str = "slow";
/// Log lines containing this marker make validation fail with 500.
pub const CRASH_MARKER: &str = "crash";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLogLine {
    pub instruction: String,
    #[serde(default)]
    pub remix: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLine {
    pub log_line: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Server-wide knobs, fixed when the router is built.
#[derive(Debug, Clone)]
pub struct Behavior {
    pub ping_status: StatusCode,
    pub ping_delay: Duration,
    pub slow_delay: Duration,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            ping_status: StatusCode::OK,
            ping_delay: Duration::ZERO,
            slow_delay: Duration::from_secs(2),
        }
    }
}

type Shared = Arc<Behavior>;

pub fn app() -> Router {
    app_with(Behavior::default())
}

pub fn app_with(behavior: Behavior) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route(
            "/api/v1/log-lines",
            put(create_log_line).post(validate_log_line),
        )
        .with_state(Arc::new(behavior))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Behavior::default()).await
}

pub async fn run_with(listener: TcpListener, behavior: Behavior) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(behavior)).await
}

fn failure(status: StatusCode, message: &str) -> Response {
    let body = ErrorBody {
        message: message.to_string(),
    };
    (status, Json(body)).into_response()
}

/// Log line produced for an instruction and remix history.
pub fn generate(instruction: &str, remix: &[String]) -> String {
    if remix.is_empty() {
        instruction.to_string()
    } else {
        format!("{instruction} (remix #{})", remix.len())
    }
}

async fn ping(State(behavior): State<Shared>) -> (StatusCode, &'static str) {
    if !behavior.ping_delay.is_zero() {
        tokio::time::sleep(behavior.ping_delay).await;
    }
    (behavior.ping_status, "pong")
}

async fn create_log_line(State(behavior): State<Shared>, Json(input): Json<CreateLogLine>) -> Response {
    let instruction = input.instruction.trim();
    tracing::debug!(instruction, remix = input.remix.len(), "create log line");

    if instruction.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "instruction is required");
    }
    if instruction == FAIL_INSTRUCTION {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "generation failed");
    }
    if instruction == SLOW_INSTRUCTION {
        tokio::time::sleep(behavior.slow_delay).await;
    }

    let body = LogLine {
        log_line: generate(instruction, &input.remix),
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateLogLine {
    log_line: String,
}

async fn validate_log_line(
    State(behavior): State<Shared>,
    Json(input): Json<ValidateLogLine>,
) -> Response {
    tracing::debug!(len = input.log_line.len(), "validate log line");

    if input.log_line.trim().is_empty() {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "log line is empty");
    }
    if input.log_line.contains(CRASH_MARKER) {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "validator crashed");
    }
    if input.log_line == SLOW_INSTRUCTION {
        tokio::time::sleep(behavior.slow_delay).await;
    }
    StatusCode::NO_CONTENT.into_response()
}
