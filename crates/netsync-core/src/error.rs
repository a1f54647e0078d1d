// ── Core error types ──
//
// Reconciliation-level errors. Consumers never see HTTP status codes or
// JSON parse failures directly; the `From<netsync_api::Error>` impl
// translates transport-layer errors into store-level variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Store errors ─────────────────────────────────────────────────
    #[error("Cannot reach inventory at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Inventory rejected credentials: {message}")]
    AuthenticationFailed { message: String },

    #[error("Inventory store error: {message}")]
    Store {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Ambiguous lookup: {count} {kind} records match")]
    Ambiguous { kind: &'static str, count: usize },

    #[error("Entity not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Facts errors ─────────────────────────────────────────────────
    #[error("Cannot collect facts for {device}: {message}")]
    Facts { device: String, message: String },

    #[error("Unsupported operating system '{os}' on {device}")]
    UnsupportedOs { device: String, os: String },

    #[error("No inventory identity for {device}: {source}")]
    MissingIdentity {
        device: String,
        source: Box<CoreError>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netsync_api::Error> for CoreError {
    fn from(err: netsync_api::Error) -> Self {
        let status = err.status();
        let transient = err.is_transient();
        match err {
            netsync_api::Error::InvalidToken { message } => {
                CoreError::AuthenticationFailed { message }
            }
            netsync_api::Error::Transport(ref e) if transient => {
                CoreError::ConnectionFailed {
                    url: e
                        .url()
                        .map_or_else(|| "<unknown>".into(), ToString::to_string),
                    reason: e.to_string(),
                }
            }
            netsync_api::Error::Transport(e) => CoreError::Store {
                status,
                message: e.to_string(),
            },
            netsync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            netsync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            netsync_api::Error::Api { message, .. } => CoreError::Store { message, status },
            netsync_api::Error::Ambiguous { endpoint, count } => CoreError::Ambiguous {
                kind: endpoint,
                count,
            },
            netsync_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_keep_their_status() {
        let err = CoreError::from(netsync_api::Error::Api {
            status: 503,
            message: "maintenance".into(),
        });
        assert!(matches!(
            err,
            CoreError::Store { status: Some(503), ref message } if message == "maintenance"
        ));
    }

    #[test]
    fn rejected_token_is_authentication_failure() {
        let err = CoreError::from(netsync_api::Error::InvalidToken {
            message: "Invalid token".into(),
        });
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }
}
