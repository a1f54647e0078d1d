// ── Device facts ──
//
// Collected bundles (`raw`) are normalized per OS family into one
// `DeviceFacts` shape before any reconciler sees them.

mod file;
mod normalize;
pub mod raw;

use std::future::Future;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::CoreError;

pub use file::FileFactsProvider;
pub use raw::FactBundle;

// ── OS family ───────────────────────────────────────────────────────

/// Supported switch operating systems.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OsFamily {
    Ios,
    IosXe,
    NxOs,
}

impl OsFamily {
    /// The `OS` custom field value (`IOS`, `IOS-XE`, `NX-OS`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Ios => "IOS",
            Self::IosXe => "IOS-XE",
            Self::NxOs => "NX-OS",
        }
    }

    /// Parse an `OS` custom field value. Dashes and case are ignored, so
    /// `IOS-XE`, `iosxe` and `IosXe` all match.
    pub fn from_label(label: &str) -> Option<Self> {
        label.replace('-', "").parse().ok()
    }

    /// Classify a CDP software-version string. `IOS-XE` and `NX-OS` are
    /// checked before the bare `IOS` marker they both contain.
    pub fn classify(software_version: &str) -> Option<Self> {
        if software_version.contains("IOS-XE") {
            Some(Self::IosXe)
        } else if software_version.contains("NX-OS") {
            Some(Self::NxOs)
        } else if software_version.contains("IOS") {
            Some(Self::Ios)
        } else {
            None
        }
    }
}

// ── Targets ─────────────────────────────────────────────────────────

/// A device the engine should reconcile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTarget {
    pub name: String,
    pub host: Option<Ipv4Addr>,
    pub os: OsFamily,
}

// ── Normalized facts ────────────────────────────────────────────────

/// One device's facts, OS differences resolved.
#[derive(Debug, Clone)]
pub struct DeviceFacts {
    pub identity: DeviceIdentity,
    /// `None` when the VLAN table carried no VLANs at all.
    pub vlans: Option<Vec<VlanFact>>,
    pub interfaces: Vec<InterfaceFact>,
    pub inventory: InventoryFacts,
    /// `None` when CDP is unsupported; `Some(empty)` when it saw nobody.
    pub neighbors: Option<Vec<CdpNeighbor>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub hostname: String,
    pub os: OsFamily,
    pub version: String,
    /// Chassis serial as reported. Blanked for stacks at reconcile time.
    pub serial: String,
    pub platform: String,
    pub chassis: String,
    /// Stack member count; `None` when the device cannot stack.
    pub stack_members: Option<usize>,
    pub management_ip: Ipv4Addr,
}

impl DeviceIdentity {
    pub fn is_stacked(&self) -> bool {
        self.stack_members.is_some_and(|n| n > 1)
    }

    /// Management address in the form it is registered: always `/24`.
    pub fn management_address(&self) -> String {
        format!("{}/24", self.management_ip)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanFact {
    pub vid: u16,
    /// As reported; `None` when the device gave no name.
    pub name: Option<String>,
}

impl VlanFact {
    /// Name to store: the reported one, or `VLAN_<vid>`.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("VLAN_{}", self.vid))
    }

    /// VLAN 1 reported under the factory name is never synced.
    pub fn is_factory_default(&self) -> bool {
        self.vid == 1 && self.name.as_deref() == Some("default")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceFact {
    pub name: String,
    pub status: String,
    pub description: String,
    pub media: Option<String>,
    /// CIDR-form addresses.
    pub addresses: Vec<String>,
}

/// Inventory as the device's OS family reports it.
#[derive(Debug, Clone)]
pub enum InventoryFacts {
    Ios(raw::IosInventory),
    IosXe(raw::IosXeInventory),
    NxOs(raw::NxosInventory),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdpNeighbor {
    pub device_id: String,
    pub capabilities: String,
    /// Reported platform with any leading `cisco ` removed.
    pub device_type: String,
    pub local_interface: String,
    pub port_id: String,
    pub native_vlan: Option<String>,
    pub software_version: String,
    pub management_ip: Option<Ipv4Addr>,
}

impl CdpNeighbor {
    /// Platform family: device type without a `WS-` prefix, cut at the
    /// first dash (`WS-C2960X-48FPD-L` -> `C2960X`).
    pub fn platform(&self) -> &str {
        let model = self
            .device_type
            .strip_prefix("WS-")
            .unwrap_or(&self.device_type);
        model.split('-').next().unwrap_or(model)
    }

    /// Name of the neighbor's management interface.
    pub fn management_interface(&self) -> String {
        match self.native_vlan.as_deref() {
            Some(vlan) if !vlan.is_empty() && vlan != "N/A" => format!("Vlan{vlan}"),
            _ => "Vlan1".to_string(),
        }
    }

    /// Whether the capability string names a switch (`Switch`,
    /// `switch_igmp`, `Switch IGMP`, ...).
    pub fn is_switch(&self) -> bool {
        self.capabilities
            .split(['_', ' '])
            .next()
            .is_some_and(|first| first.eq_ignore_ascii_case("switch"))
    }
}

// ── Provider contract ───────────────────────────────────────────────

/// Source of per-device fact bundles.
pub trait FactsProvider: Send + Sync {
    fn collect(
        &self,
        target: &DeviceTarget,
    ) -> impl Future<Output = Result<FactBundle, CoreError>> + Send;
}
