// ── Runtime configuration ──
//
// These types describe *how* to reach NetBox and the fixed ids the
// reconcilers write with. They never touch disk; the CLI builds them
// from `netsync-config` and hands them in.

use std::time::Duration;

use netsync_api::RecordId;
use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for internal NetBox installs.
    #[default]
    DangerAcceptInvalid,
}

/// Connection settings for a NetBox instance.
#[derive(Debug, Clone)]
pub struct NetboxConfig {
    /// NetBox base URL (e.g., `https://netbox.example.com`).
    pub url: Url,
    /// API token.
    pub token: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

/// Ids and switches the reconcilers need from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Site for devices no other rule places.
    pub default_site_id: RecordId,
    /// Manufacturer for device types and inventory items.
    pub primary_manufacturer_id: RecordId,
    /// Manufacturer for optic module types.
    pub generic_manufacturer_id: RecordId,
    /// Sync VLANs from NX-OS devices. Off by default: without VTP the
    /// local table on a Nexus can disagree with the rest of the domain.
    pub nexus_vtp: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_site_id: RecordId(5),
            primary_manufacturer_id: RecordId(1),
            generic_manufacturer_id: RecordId(2),
            nexus_vtp: false,
        }
    }
}
