//! Classification helpers applied to a received `HttpResponse`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::http::HttpResponse;

/// The response status differs from the one the operation succeeds with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected status {expected}, got {actual}")]
pub struct StatusError {
    pub expected: u16,
    pub actual: u16,
}

/// Structured error payload sent by Gen-API alongside a failure status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Error)]
#[error("{message}")]
pub struct ResponseError {
    #[serde(alias = "error")]
    pub message: String,
}

pub fn ensure_status(response: &HttpResponse, expected: u16) -> Result<(), StatusError> {
    if response.status == expected {
        return Ok(());
    }
    Err(StatusError {
        expected,
        actual: response.status,
    })
}

/// Decode the error payload of a failed response. Empty or foreign bodies
/// yield `None`.
pub fn response_error(response: &HttpResponse) -> Option<ResponseError> {
    if response.body.trim().is_empty() {
        return None;
    }
    serde_json::from_str(&response.body).ok()
}

pub fn extract_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, serde_json::Error> {
    serde_json::from_str(&response.body)
}
