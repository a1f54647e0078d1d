//! Configuration for netsync.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `netsync_core::{NetboxConfig, EngineConfig}`. The
//! flat variables older deployments set (`NETBOX_URL`, `NETBOX_TOKEN`,
//! `DEFAULT_SITE_ID`, ...) still override the selected profile.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::{Uncased, UncasedStr},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use netsync_core::{EngineConfig, NetboxConfig, RecordId, TlsVerification};

const KEYRING_SERVICE: &str = "netsync";

/// Environment variable read for the token when a profile names none.
pub const LEGACY_TOKEN_ENV: &str = "NETBOX_TOKEN";

/// Flat environment variables and the profile field each overrides.
const LEGACY_ENV: [(&str, &str); 5] = [
    ("NETBOX_URL", "netbox_url"),
    ("DEFAULT_SITE_ID", "default_site_id"),
    ("CISCO_MANUFACTURER_ID", "primary_manufacturer_id"),
    ("GENERIC_MANUFACTURER_ID", "generic_manufacturer_id"),
    ("NX_VTP", "nexus_vtp"),
];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("no API token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named NetBox profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Site for devices nothing else places.
    #[serde(default = "default_site_id")]
    pub default_site_id: u64,

    /// Manufacturer for device types and inventory items.
    #[serde(default = "default_primary_manufacturer")]
    pub primary_manufacturer_id: u64,

    /// Manufacturer for optic module types.
    #[serde(default = "default_generic_manufacturer")]
    pub generic_manufacturer_id: u64,

    #[serde(default)]
    pub nexus_vtp: bool,

    /// Directory holding `<device>.json` fact bundles.
    #[serde(default = "default_facts_dir")]
    pub facts_dir: PathBuf,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            default_site_id: default_site_id(),
            primary_manufacturer_id: default_primary_manufacturer(),
            generic_manufacturer_id: default_generic_manufacturer(),
            nexus_vtp: false,
            facts_dir: default_facts_dir(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_site_id() -> u64 {
    5
}
fn default_primary_manufacturer() -> u64 {
    1
}
fn default_generic_manufacturer() -> u64 {
    2
}
fn default_facts_dir() -> PathBuf {
    PathBuf::from("facts")
}

/// A named NetBox profile. Unset fields fall back to [`Defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// NetBox base URL (e.g., "https://netbox.example.com").
    #[serde(default)]
    pub netbox_url: String,

    /// API token in plaintext. Prefer the keyring or an env var.
    pub token: Option<String>,

    /// Environment variable name containing the API token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    pub default_site_id: Option<u64>,
    pub primary_manufacturer_id: Option<u64>,
    pub generic_manufacturer_id: Option<u64>,
    pub nexus_vtp: Option<bool>,
    pub facts_dir: Option<PathBuf>,
}

impl Config {
    /// A config with one profile pointing at `url`, made default.
    pub fn with_profile(name: &str, url: &str) -> Self {
        let mut cfg = Self {
            default_profile: Some(name.into()),
            ..Self::default()
        };
        cfg.profiles.insert(
            name.into(),
            Profile {
                netbox_url: url.into(),
                ..Profile::default()
            },
        );
        cfg
    }

    /// Name of the profile to use: `requested`, else `default_profile`,
    /// else `"default"`.
    pub fn profile_name(&self, requested: Option<&str>) -> String {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
            .to_string()
    }

    /// The selected profile with flat environment overrides applied.
    ///
    /// A profile missing from the file is still usable when `NETBOX_URL`
    /// is set, so environment-only deployments need no config file.
    pub fn select_profile(&self, requested: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = self.profile_name(requested);
        let base = self.profiles.get(&name).cloned().unwrap_or_default();

        let profile: Profile = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Env::raw().only(&LEGACY_ENV.map(|(env, _)| env)).map(legacy_key))
            .extract()?;

        if profile.netbox_url.is_empty() {
            return Err(ConfigError::UnknownProfile { profile: name });
        }
        Ok((name, profile))
    }
}

fn legacy_key(key: &UncasedStr) -> Uncased<'_> {
    LEGACY_ENV
        .iter()
        .find(|(env, _)| key.as_str().eq_ignore_ascii_case(env))
        .map_or_else(|| Uncased::from(key.as_str()), |(_, field)| Uncased::from(*field))
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "netsync", "netsync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("netsync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) + `NETSYNC_` environment.
///
/// Nested keys use a double underscore: `NETSYNC_DEFAULTS__NEXUS_VTP=true`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the API token: env var, then system keyring, then plaintext.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env (or NETBOX_TOKEN) → env var lookup
    let env_name = profile.token_env.as_deref().unwrap_or(LEGACY_TOKEN_ENV);
    if let Ok(val) = std::env::var(env_name) {
        if !val.is_empty() {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
        .and_then(|entry| entry.set_password(token))
        .map_err(|e| ConfigError::Validation {
            field: "token".into(),
            reason: format!("keyring: {e}"),
        })
}

// ── Translation to runtime config ───────────────────────────────────

/// TLS mode for a profile. A CA file wins; `insecure = false` asks for
/// strict system verification; anything else accepts self-signed
/// certificates, which most internal NetBox installs use.
pub fn tls_for(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if let Some(ref ca_path) = profile.ca_cert {
        return TlsVerification::CustomCa(ca_path.clone());
    }
    match profile.insecure {
        Some(false) => TlsVerification::SystemDefaults,
        Some(true) => TlsVerification::DangerAcceptInvalid,
        None if defaults.insecure => TlsVerification::DangerAcceptInvalid,
        None => TlsVerification::default(),
    }
}

/// Build a `NetboxConfig` from a profile.
pub fn netbox_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<NetboxConfig, ConfigError> {
    let url: url::Url = profile
        .netbox_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "netbox_url".into(),
            reason: format!("invalid URL: {}", profile.netbox_url),
        })?;

    let token = resolve_token(profile, profile_name)?;
    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(NetboxConfig {
        url,
        token,
        tls: tls_for(profile, defaults),
        timeout,
    })
}

/// The fixed ids and switches the reconcilers run with.
pub fn engine_config(profile: &Profile, defaults: &Defaults) -> EngineConfig {
    EngineConfig {
        default_site_id: RecordId(profile.default_site_id.unwrap_or(defaults.default_site_id)),
        primary_manufacturer_id: RecordId(
            profile
                .primary_manufacturer_id
                .unwrap_or(defaults.primary_manufacturer_id),
        ),
        generic_manufacturer_id: RecordId(
            profile
                .generic_manufacturer_id
                .unwrap_or(defaults.generic_manufacturer_id),
        ),
        nexus_vtp: profile.nexus_vtp.unwrap_or(defaults.nexus_vtp),
    }
}

/// Facts directory: profile, then defaults.
pub fn facts_dir(profile: &Profile, defaults: &Defaults) -> PathBuf {
    profile
        .facts_dir
        .clone()
        .unwrap_or_else(|| defaults.facts_dir.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r#"
        default_profile = "lab"

        [defaults]
        timeout = 10
        nexus_vtp = true

        [profiles.lab]
        netbox_url = "https://netbox.lab.example"
        token_env = "LAB_NETBOX_TOKEN"
        default_site_id = 12
    "#;

    #[test]
    fn loads_profiles_and_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            let cfg = load_config_from(Path::new("config.toml")).unwrap();

            let (name, profile) = cfg.select_profile(None).unwrap();
            assert_eq!(name, "lab");
            assert_eq!(profile.netbox_url, "https://netbox.lab.example");

            let engine = engine_config(&profile, &cfg.defaults);
            assert_eq!(engine.default_site_id, RecordId(12));
            assert_eq!(engine.primary_manufacturer_id, RecordId(1));
            assert_eq!(engine.generic_manufacturer_id, RecordId(2));
            assert!(engine.nexus_vtp);
            assert_eq!(facts_dir(&profile, &cfg.defaults), PathBuf::from("facts"));
            Ok(())
        });
    }

    #[test]
    fn missing_file_gives_defaults() {
        Jail::expect_with(|_| {
            let cfg = load_config_from(Path::new("nope.toml")).unwrap();
            assert_eq!(cfg.defaults, Defaults::default());
            assert!(cfg.profiles.is_empty());
            Ok(())
        });
    }

    #[test]
    fn prefixed_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("NETSYNC_DEFAULTS__TIMEOUT", "45");
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.defaults.timeout, 45);
            Ok(())
        });
    }

    #[test]
    fn legacy_env_overrides_profile() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("NETBOX_URL", "https://netbox.prod.example");
            jail.set_env("DEFAULT_SITE_ID", "3");
            jail.set_env("CISCO_MANUFACTURER_ID", "8");
            jail.set_env("NX_VTP", "false");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            let (_, profile) = cfg.select_profile(Some("lab")).unwrap();

            assert_eq!(profile.netbox_url, "https://netbox.prod.example");
            assert_eq!(profile.default_site_id, Some(3));
            assert_eq!(profile.primary_manufacturer_id, Some(8));
            assert_eq!(profile.nexus_vtp, Some(false));
            // Untouched fields survive.
            assert_eq!(profile.token_env.as_deref(), Some("LAB_NETBOX_TOKEN"));
            Ok(())
        });
    }

    #[test]
    fn env_only_profile() {
        Jail::expect_with(|jail| {
            jail.set_env("NETBOX_URL", "https://netbox.example");
            let cfg = Config::default();
            let (name, profile) = cfg.select_profile(None).unwrap();
            assert_eq!(name, "default");
            assert_eq!(profile.netbox_url, "https://netbox.example");
            Ok(())
        });
    }

    #[test]
    fn unknown_profile_without_url_fails() {
        let cfg = Config::default();
        let err = cfg.select_profile(Some("missing-profile-xyz"));
        // NETBOX_URL may be set in the developer's shell; only assert the
        // shape when it is not.
        if std::env::var("NETBOX_URL").is_err() {
            assert!(matches!(err, Err(ConfigError::UnknownProfile { .. })));
        }
    }

    #[test]
    fn token_from_named_env_var() {
        Jail::expect_with(|jail| {
            jail.set_env("LAB_NETBOX_TOKEN", "0123456789abcdef");
            let profile = Profile {
                netbox_url: "https://netbox.lab.example".into(),
                token_env: Some("LAB_NETBOX_TOKEN".into()),
                token: Some("plaintext-loses".into()),
                ..Profile::default()
            };
            let token = resolve_token(&profile, "lab").unwrap();
            assert_eq!(token.expose_secret(), "0123456789abcdef");

            let netbox = netbox_config(&profile, "lab", &Defaults::default()).unwrap();
            assert_eq!(netbox.url.as_str(), "https://netbox.lab.example/");
            assert_eq!(netbox.timeout, Duration::from_secs(30));
            assert_eq!(netbox.tls, TlsVerification::DangerAcceptInvalid);
            Ok(())
        });
    }

    #[test]
    fn invalid_url_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("LAB_NETBOX_TOKEN", "t");
            let profile = Profile {
                netbox_url: "not a url".into(),
                token_env: Some("LAB_NETBOX_TOKEN".into()),
                ..Profile::default()
            };
            let err = netbox_config(&profile, "lab", &Defaults::default()).unwrap_err();
            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "netbox_url"));
            Ok(())
        });
    }

    #[test]
    fn tls_selection() {
        let defaults = Defaults::default();
        let mut profile = Profile::default();
        assert_eq!(tls_for(&profile, &defaults), TlsVerification::DangerAcceptInvalid);

        profile.insecure = Some(false);
        assert_eq!(tls_for(&profile, &defaults), TlsVerification::SystemDefaults);

        profile.ca_cert = Some(PathBuf::from("/etc/ssl/netbox.pem"));
        assert_eq!(
            tls_for(&profile, &defaults),
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/netbox.pem"))
        );
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config::with_profile("hq", "https://netbox.hq.example");

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.default_profile.as_deref(), Some("hq"));
        assert_eq!(loaded.profiles["hq"].netbox_url, "https://netbox.hq.example");
    }
}
