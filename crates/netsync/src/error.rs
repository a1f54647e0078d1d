//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use netsync_config::ConfigError;
use netsync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PARTIAL: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to NetBox at {url}")]
    #[diagnostic(
        code(netsync::connection_failed),
        help(
            "Check that NetBox is running and reachable.\n\
             URL: {url}\n\
             Self-signed certificate? Try --insecure or set ca_cert in your profile."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(netsync::auth_failed),
        help(
            "Verify the API token for profile '{profile}'.\n\
             Tokens are managed under Admin > API Tokens in NetBox."
        )
    )]
    AuthFailed { profile: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(netsync::no_credentials),
        help(
            "Store one with: netsync config init --url <URL> --token <TOKEN>\n\
             Or set NETBOX_TOKEN / NETSYNC_TOKEN."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(netsync::not_found))]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    // ── Store / facts ────────────────────────────────────────────────
    #[error("NetBox error: {message}")]
    #[diagnostic(code(netsync::store))]
    Store { message: String },

    #[error("Facts for {device}: {message}")]
    #[diagnostic(
        code(netsync::facts),
        help("Fact bundles are read from <facts_dir>/<device>.json.")
    )]
    Facts { device: String, message: String },

    #[error("{failed} of {total} devices failed")]
    #[diagnostic(
        code(netsync::partial_run),
        help("Re-run with -v to see per-device errors.")
    )]
    PartialRun { failed: usize, total: usize },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(netsync::profile_not_found),
        help(
            "Create one with: netsync config init --url <URL>\n\
             Or set NETBOX_URL.\n\
             Expected config at: {path}"
        )
    )]
    ProfileNotFound { name: String, path: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(code(netsync::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(netsync::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot render output: {0}")]
    #[diagnostic(code(netsync::render))]
    Render(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(netsync::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::PartialRun { .. } => exit_code::PARTIAL,
            Self::Validation { .. } | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                path: netsync_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message: _ } => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                resource_type: entity_type,
                identifier,
            },

            CoreError::Facts { device, message } => CliError::Facts { device, message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Store { .. }
            | CoreError::Ambiguous { .. }
            | CoreError::UnsupportedOs { .. }
            | CoreError::MissingIdentity { .. } => CliError::Store {
                message: err.to_string(),
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(
            CliError::PartialRun { failed: 1, total: 3 }.exit_code(),
            exit_code::PARTIAL
        );
        assert_eq!(
            CliError::from(ConfigError::NoCredentials {
                profile: "lab".into()
            })
            .exit_code(),
            exit_code::AUTH
        );
        assert_eq!(
            CliError::from(CoreError::NotFound {
                entity_type: "device role".into(),
                identifier: "switch".into(),
            })
            .exit_code(),
            exit_code::NOT_FOUND
        );
    }

    #[test]
    fn store_errors_keep_their_message() {
        let err = CliError::from(CoreError::Ambiguous {
            kind: "dcim/devices/",
            count: 2,
        });
        assert!(err.to_string().contains("2 dcim/devices/ records match"));
    }
}
