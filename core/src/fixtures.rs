//! Canned Gen-API responses, keyed by operation and use-case name.
//!
//! # Design
//! The table is parsed once by the composition root and shared read-only
//! (`Arc<FixtureTable>`) with every client that offers `mock`. There is no
//! mutation API. A table that fails to load must stop startup; this module
//! only reports the failure.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::error::{Cause, Error, ErrorKind};

/// Use case selected when the caller passes an empty name.
pub const DEFAULT_USE_CASE: &str = "success";

/// Fixture document bundled with the crate.
pub const EMBEDDED_FIXTURES: &str = include_str!("../fixtures/log-line-mocks.yaml");

#[derive(Debug, Error)]
pub enum FixtureLoadError {
    #[error("failed to read fixtures from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixtures: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("fixture {operation}.{use_case} is inconsistent: {reason}")]
    Inconsistent {
        operation: &'static str,
        use_case: String,
        reason: &'static str,
    },
}

/// Error kinds a fixture may declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureErrorKind {
    InvalidLogLine,
    Unavailable,
    UnexpectedStatus,
    Transport,
    #[default]
    Mocked,
}

impl From<FixtureErrorKind> for ErrorKind {
    fn from(kind: FixtureErrorKind) -> Self {
        match kind {
            FixtureErrorKind::InvalidLogLine => ErrorKind::InvalidLogLine,
            FixtureErrorKind::Unavailable => ErrorKind::Unavailable,
            FixtureErrorKind::UnexpectedStatus => ErrorKind::UnexpectedStatus,
            FixtureErrorKind::Transport => ErrorKind::Transport,
            FixtureErrorKind::Mocked => ErrorKind::Mocked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureError {
    #[serde(default)]
    pub kind: FixtureErrorKind,
    #[serde(default)]
    pub message: Option<String>,
}

impl FixtureError {
    pub fn to_error(&self, status: u16) -> Error {
        let err = Error::new(self.kind.into(), status);
        match &self.message {
            Some(message) => err.with_cause(Cause::Message(message.clone())),
            None => err,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateFixture {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub err: Option<FixtureError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateFixture {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub err: Option<FixtureError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureTable {
    #[serde(default)]
    create: HashMap<String, CreateFixture>,
    #[serde(default)]
    validate: HashMap<String, ValidateFixture>,
}

/// Map an empty use-case name to [`DEFAULT_USE_CASE`].
pub fn normalize_use_case(use_case: &str) -> &str {
    if use_case.is_empty() {
        DEFAULT_USE_CASE
    } else {
        use_case
    }
}

impl FixtureTable {
    /// Parse the fixtures bundled with the crate.
    pub fn embedded() -> Result<Self, FixtureLoadError> {
        Self::from_yaml_str(EMBEDDED_FIXTURES)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, FixtureLoadError> {
        let table: FixtureTable = serde_yaml::from_str(source)?;
        table.check_consistency()?;
        tracing::debug!(
            create = table.create.len(),
            validate = table.validate.len(),
            "loaded mock fixtures"
        );
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureLoadError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| FixtureLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }

    pub fn create(&self, use_case: &str) -> Option<&CreateFixture> {
        self.create.get(normalize_use_case(use_case))
    }

    pub fn validate(&self, use_case: &str) -> Option<&ValidateFixture> {
        self.validate.get(normalize_use_case(use_case))
    }

    pub fn create_use_cases(&self) -> impl Iterator<Item = &str> {
        self.create.keys().map(String::as_str)
    }

    pub fn validate_use_cases(&self) -> impl Iterator<Item = &str> {
        self.validate.keys().map(String::as_str)
    }

    // A fixture maps to a single `Result`, so it cannot carry both a
    // payload and an error.
    fn check_consistency(&self) -> Result<(), FixtureLoadError> {
        for (use_case, fixture) in &self.create {
            if fixture.err.is_some() && !fixture.result.is_empty() {
                return Err(FixtureLoadError::Inconsistent {
                    operation: "create",
                    use_case: use_case.clone(),
                    reason: "declares both a result and an error",
                });
            }
        }
        Ok(())
    }
}
