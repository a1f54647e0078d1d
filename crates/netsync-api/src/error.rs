use thiserror::Error;

/// Top-level error type for the `netsync-api` crate.
///
/// Covers every failure mode of talking to NetBox: token handling,
/// transport, structured API errors, and response decoding.
/// `netsync-core` maps these into reconciliation-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API token was rejected (HTTP 401/403).
    #[error("Invalid API token: {message}")]
    InvalidToken { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success response from NetBox. `message` carries the
    /// field-level validation detail when the body had one.
    #[error("NetBox API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A natural-key lookup matched more than one record.
    #[error("Expected at most one {endpoint} record, found {count}")]
    Ambiguous { endpoint: &'static str, count: usize },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next scheduled run.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> Error {
        Error::Api {
            status,
            message: String::new(),
        }
    }

    #[test]
    fn server_errors_are_transient() {
        assert!(api(503).is_transient());
        assert!(!api(404).is_transient());
        assert!(!Error::Tls("bad cert".into()).is_transient());
    }

    #[test]
    fn status_comes_from_the_response() {
        assert_eq!(api(409).status(), Some(409));
        assert!(api(404).is_not_found());
        assert_eq!(
            Error::InvalidToken {
                message: String::new()
            }
            .status(),
            None
        );
    }
}
