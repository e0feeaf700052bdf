//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use phoenixbad_config::ConfigError;
use phoenixbad_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const PARSE: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const ALL_UNAVAILABLE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Fetch ────────────────────────────────────────────────────────

    #[error("Could not reach the {area} endpoint")]
    #[diagnostic(
        code(phoenixbad::connection_failed),
        help(
            "Check your network connection and the configured URL.\n\
             Show the active URLs with: phoenixbad config show"
        )
    )]
    ConnectionFailed {
        area: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("The {area} endpoint answered HTTP {status}")]
    #[diagnostic(
        code(phoenixbad::http_status),
        help("The live visitor service may be down or the URL may have changed.")
    )]
    HttpStatus { area: String, status: u16 },

    #[error("Request to the {area} endpoint timed out after {seconds}s")]
    #[diagnostic(
        code(phoenixbad::timeout),
        help("Increase the timeout with --timeout, e.g. --timeout 30s.")
    )]
    Timeout { area: String, seconds: u64 },

    // ── Parse ────────────────────────────────────────────────────────

    #[error("Could not read occupancy from the {area} response: {reason}")]
    #[diagnostic(
        code(phoenixbad::parse),
        help(
            "The response format may have changed. Save the body and inspect it with:\n\
             phoenixbad parse <file> -vv"
        )
    )]
    Parse { area: String, reason: String },

    // ── Cycle ────────────────────────────────────────────────────────

    #[error("No area could be polled")]
    #[diagnostic(code(phoenixbad::all_unavailable), help("{details}"))]
    AllUnavailable { details: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(phoenixbad::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(phoenixbad::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(phoenixbad::config))]
    Config(Box<figment::Error>),

    // ── Internal ─────────────────────────────────────────────────────

    #[error("Internal error: {0}")]
    #[diagnostic(code(phoenixbad::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(phoenixbad::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(phoenixbad::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(phoenixbad::toml))]
    Toml(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::HttpStatus { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Parse { .. } => exit_code::PARSE,
            Self::AllUnavailable { .. } => exit_code::ALL_UNAVAILABLE,
            Self::Validation { .. } | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { area, reason } => CliError::ConnectionFailed {
                area,
                source: reason.into(),
            },

            CoreError::HttpStatus { area, status } => CliError::HttpStatus { area, status },

            CoreError::Timeout { area, timeout_secs } => CliError::Timeout {
                area,
                seconds: timeout_secs,
            },

            CoreError::MissingField { area, field } => CliError::Parse {
                area,
                reason: format!("missing {field}"),
            },

            CoreError::MalformedNumber { area, field, value } => CliError::Parse {
                area,
                reason: format!("{field} is not a valid number: '{value}'"),
            },

            CoreError::AllAreasUnavailable { failures } => CliError::AllUnavailable {
                details: failures
                    .iter()
                    .map(|(_, failure)| failure.message.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            CoreError::Cancelled => CliError::Internal("poll cycle cancelled".into()),

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Serialization(e) => CliError::Toml(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use phoenixbad_core::{Area, AreaFailure, ErrorKind};

    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::Timeout {
                    area: "pool".into(),
                    timeout_secs: 10,
                },
                exit_code::TIMEOUT,
            ),
            (
                CoreError::HttpStatus {
                    area: "pool".into(),
                    status: 502,
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::MalformedNumber {
                    area: "sauna".into(),
                    field: "data-free attribute".into(),
                    value: "abc".into(),
                },
                exit_code::PARSE,
            ),
            (
                CoreError::Config {
                    message: "no areas configured".into(),
                },
                exit_code::USAGE,
            ),
        ];
        for (core, code) in cases {
            let cli = CliError::from(core);
            assert_eq!(cli.exit_code(), code, "{cli}");
        }
    }

    #[test]
    fn all_unavailable_lists_each_area() {
        let err = CliError::from(CoreError::AllAreasUnavailable {
            failures: vec![
                (
                    Area::Pool,
                    AreaFailure {
                        kind: ErrorKind::Timeout,
                        message: "pool: request timed out after 10s".into(),
                    },
                ),
                (
                    Area::Sauna,
                    AreaFailure {
                        kind: ErrorKind::HttpStatus(503),
                        message: "sauna: endpoint returned HTTP 503".into(),
                    },
                ),
            ],
        });
        assert_eq!(err.exit_code(), exit_code::ALL_UNAVAILABLE);
        let CliError::AllUnavailable { details } = err else {
            panic!("expected AllUnavailable");
        };
        assert_eq!(
            details,
            "pool: request timed out after 10s\nsauna: endpoint returned HTTP 503"
        );
    }
}
