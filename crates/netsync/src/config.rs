//! CLI configuration: thin wrapper around `netsync_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--netbox-url, --token, --insecure, --timeout).

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use netsync_core::{EngineConfig, NetboxConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use netsync_config::{Config, Profile, config_path, load_config, save_config};

/// Everything a run needs, resolved once.
pub struct Resolved {
    pub profile_name: String,
    pub netbox: NetboxConfig,
    pub engine: EngineConfig,
    pub facts_dir: PathBuf,
}

/// Select the active profile and apply flag overrides on top of it.
///
/// Precedence: flags, then `NETSYNC_*` / legacy environment, then the
/// profile, then `[defaults]`.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let requested = global.profile.as_deref();
    let (profile_name, mut profile) = match config.select_profile(requested) {
        Ok(found) => found,
        // A URL on the command line is enough to run without a profile.
        Err(netsync_config::ConfigError::UnknownProfile { profile }) if global.netbox_url.is_some() => {
            (profile, Profile::default())
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(ref url) = global.netbox_url {
        profile.netbox_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let mut netbox = match global.token {
        Some(ref token) => {
            let url = profile.netbox_url.parse().map_err(|_| CliError::Validation {
                field: "netbox_url".into(),
                reason: format!("invalid URL: {}", profile.netbox_url),
            })?;
            NetboxConfig {
                url,
                token: SecretString::from(token.clone()),
                tls: netsync_config::tls_for(&profile, &config.defaults),
                timeout: Duration::from_secs(profile.timeout.unwrap_or(config.defaults.timeout)),
            }
        }
        None => netsync_config::netbox_config(&profile, &profile_name, &config.defaults)?,
    };
    if global.insecure {
        netbox.tls = TlsVerification::DangerAcceptInvalid;
    }

    Ok(Resolved {
        engine: netsync_config::engine_config(&profile, &config.defaults),
        facts_dir: netsync_config::facts_dir(&profile, &config.defaults),
        netbox,
        profile_name,
    })
}
