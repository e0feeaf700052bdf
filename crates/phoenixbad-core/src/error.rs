// ── Core error types ──
//
// Domain errors from phoenixbad-core. Per-area fetch and parse failures are
// kept local to their area by the service; only `AllAreasUnavailable` is a
// cycle-level failure. The `From<phoenixbad_api::Error>` impl translates
// transport and parsing errors into these variants.

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use crate::model::{Area, AreaFailure};

/// Coarse classification of a failure, stored in the cached area state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case", tag = "kind", content = "status")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    ConnectionFailed,
    HttpStatus(u16),
    MissingField,
    MalformedNumber,
    AllAreasUnavailable,
    Cancelled,
    Config,
    Internal,
}

impl ErrorKind {
    /// Failure to obtain a response at all.
    pub fn is_fetch(self) -> bool {
        matches!(self, Self::Timeout | Self::ConnectionFailed | Self::HttpStatus(_))
    }

    /// A response arrived but could not be interpreted.
    pub fn is_parse(self) -> bool {
        matches!(self, Self::MissingField | Self::MalformedNumber)
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Fetch errors ─────────────────────────────────────────────────
    #[error("{area}: request timed out after {timeout_secs}s")]
    Timeout { area: String, timeout_secs: u64 },

    #[error("{area}: connection failed: {reason}")]
    ConnectionFailed { area: String, reason: String },

    #[error("{area}: endpoint returned HTTP {status}")]
    HttpStatus { area: String, status: u16 },

    // ── Parse errors ─────────────────────────────────────────────────
    #[error("{area}: response is missing {field}")]
    MissingField { area: String, field: String },

    #[error("{area}: {field} is not a valid number: '{value}'")]
    MalformedNumber {
        area: String,
        field: String,
        value: String,
    },

    // ── Cycle errors ─────────────────────────────────────────────────
    #[error("All {} areas unavailable", .failures.len())]
    AllAreasUnavailable { failures: Vec<(Area, AreaFailure)> },

    #[error("Poll cycle discarded: coordinator is shut down")]
    Cancelled,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ConnectionFailed { .. } => ErrorKind::ConnectionFailed,
            Self::HttpStatus { status, .. } => ErrorKind::HttpStatus(*status),
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::MalformedNumber { .. } => ErrorKind::MalformedNumber,
            Self::AllAreasUnavailable { .. } => ErrorKind::AllAreasUnavailable,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Config { .. } => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Snapshot of this error as stored in [`crate::CachedAreaState`].
    pub fn to_failure(&self) -> AreaFailure {
        AreaFailure {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<phoenixbad_api::Error> for CoreError {
    fn from(err: phoenixbad_api::Error) -> Self {
        match err {
            phoenixbad_api::Error::Timeout { area, timeout_secs } => {
                CoreError::Timeout { area, timeout_secs }
            }
            phoenixbad_api::Error::ConnectionFailed { area, reason } => {
                CoreError::ConnectionFailed { area, reason }
            }
            phoenixbad_api::Error::HttpStatus { area, status } => {
                CoreError::HttpStatus { area, status }
            }
            phoenixbad_api::Error::InvalidHeader { area, name } => CoreError::Config {
                message: format!("{area}: invalid request header '{name}'"),
            },
            phoenixbad_api::Error::ClientBuild(message) => CoreError::Config { message },
            phoenixbad_api::Error::MissingField { area, field } => CoreError::MissingField {
                area,
                field: field.into(),
            },
            phoenixbad_api::Error::MalformedNumber { area, field, value } => {
                CoreError::MalformedNumber {
                    area,
                    field: field.into(),
                    value,
                }
            }
        }
    }
}
