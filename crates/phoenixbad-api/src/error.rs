use thiserror::Error;

/// Top-level error type for the `phoenixbad-api` crate.
///
/// Covers the two failure families of a single area poll: getting the
/// bytes (transport) and making sense of them (parsing). Every variant is
/// tagged with the area it came from. `phoenixbad-core` maps these into
/// its own error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Request did not complete within the configured timeout.
    #[error("{area}: request timed out after {timeout_secs}s")]
    Timeout { area: String, timeout_secs: u64 },

    /// Connection refused, DNS failure, TLS failure, broken body, etc.
    #[error("{area}: connection failed: {reason}")]
    ConnectionFailed { area: String, reason: String },

    /// The endpoint answered with a non-2xx status.
    #[error("{area}: endpoint returned HTTP {status}")]
    HttpStatus { area: String, status: u16 },

    /// A configured request header could not be encoded.
    #[error("{area}: invalid request header '{name}'")]
    InvalidHeader { area: String, name: String },

    /// HTTP client construction failed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Parsing ─────────────────────────────────────────────────────
    /// A required element or attribute is absent from the response.
    #[error("{area}: response is missing {field}")]
    MissingField { area: String, field: &'static str },

    /// A value was found but is not a usable number.
    #[error("{area}: {field} is not a valid number: '{value}'")]
    MalformedNumber {
        area: String,
        field: &'static str,
        value: String,
    },
}

impl Error {
    /// The area this error belongs to, if any.
    pub fn area(&self) -> Option<&str> {
        match self {
            Self::Timeout { area, .. }
            | Self::ConnectionFailed { area, .. }
            | Self::HttpStatus { area, .. }
            | Self::InvalidHeader { area, .. }
            | Self::MissingField { area, .. }
            | Self::MalformedNumber { area, .. } => Some(area),
            Self::ClientBuild(_) => None,
        }
    }

    /// Returns `true` if the request itself failed (as opposed to the body).
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::ConnectionFailed { .. } | Self::HttpStatus { .. }
        )
    }

    /// Returns `true` if the body arrived but could not be interpreted.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::MalformedNumber { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::ConnectionFailed { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_throttling_are_transient() {
        let status = |status| Error::HttpStatus {
            area: "pool".into(),
            status,
        };
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
        assert!(!status(404).is_transient());
        assert!(status(404).is_fetch_error());
    }

    #[test]
    fn client_build_has_no_area() {
        let err = Error::ClientBuild("tls backend unavailable".into());
        assert_eq!(err.area(), None);
        assert!(!err.is_fetch_error());
        assert!(!err.is_transient());
    }
}
