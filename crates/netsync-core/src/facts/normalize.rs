// ── Per-OS normalization ──

use std::net::Ipv4Addr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::raw::{CdpTable, FactBundle, InterfaceTable, PlatformFacts, VlanTable};
use super::{
    CdpNeighbor, DeviceFacts, DeviceIdentity, DeviceTarget, InterfaceFact, InventoryFacts,
    OsFamily, VlanFact,
};
use crate::error::CoreError;

const NOT_AVAILABLE: &str = "N/A";

impl FactBundle {
    /// The OS family the bundle was collected from.
    pub fn os(&self) -> OsFamily {
        match self.platform {
            PlatformFacts::Ios { .. } => OsFamily::Ios,
            PlatformFacts::Iosxe { .. } => OsFamily::IosXe,
            PlatformFacts::Nxos { .. } => OsFamily::NxOs,
        }
    }

    /// Resolve OS differences into one [`DeviceFacts`].
    pub fn normalize(self, target: &DeviceTarget) -> Result<DeviceFacts, CoreError> {
        let os = self.os();
        if os != target.os {
            warn!(
                device = %target.name,
                expected = %target.os,
                reported = %os,
                "facts report a different OS than the inventory"
            );
        }

        let management_ip =
            self.management_ip
                .or(target.host)
                .ok_or_else(|| CoreError::Facts {
                    device: target.name.clone(),
                    message: "no management address".into(),
                })?;
        let stack_members = self.switch.as_ref().map(|s| s.switch.stack.len());

        let (identity, inventory) = match self.platform {
            PlatformFacts::Ios { version, inventory } => {
                let v = version.version;
                (
                    Identity {
                        hostname: v.hostname,
                        version: v.version,
                        serial: v.chassis_sn,
                        platform: v.platform,
                        chassis: v.chassis,
                    },
                    InventoryFacts::Ios(inventory),
                )
            }
            PlatformFacts::Iosxe { version, inventory } => {
                let v = version.version;
                (
                    Identity {
                        hostname: v.hostname,
                        version: v.version,
                        serial: v.chassis_sn,
                        platform: v.platform,
                        chassis: v.chassis,
                    },
                    InventoryFacts::IosXe(inventory),
                )
            }
            PlatformFacts::Nxos {
                version,
                version_raw,
                inventory,
            } => {
                let hostname = nxos_hostname(&version_raw).ok_or_else(|| CoreError::Facts {
                    device: target.name.clone(),
                    message: "no 'Device name:' line in show version".into(),
                })?;
                let serial = inventory
                    .name
                    .get("Chassis")
                    .and_then(|c| c.serial_number.clone())
                    .unwrap_or_default();
                let hw = version.platform.hardware;
                let chassis = hw
                    .chassis
                    .split(' ')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                (
                    Identity {
                        hostname,
                        version: version.platform.software.system_version,
                        serial,
                        platform: hw.model,
                        chassis,
                    },
                    InventoryFacts::NxOs(inventory),
                )
            }
        };

        if identity.hostname.is_empty() {
            return Err(CoreError::Facts {
                device: target.name.clone(),
                message: "show version reported no hostname".into(),
            });
        }

        Ok(DeviceFacts {
            identity: DeviceIdentity {
                hostname: identity.hostname,
                os,
                version: identity.version,
                serial: identity.serial,
                platform: identity.platform,
                chassis: identity.chassis,
                stack_members,
                management_ip,
            },
            vlans: self.vlans.and_then(|t| vlans(&target.name, t)),
            interfaces: self
                .interfaces
                .map(|t| interfaces(&target.name, t))
                .unwrap_or_default(),
            inventory,
            neighbors: self.cdp.map(|t| neighbors(&target.name, t)),
        })
    }
}

/// Identity fields before the shared ones are attached.
struct Identity {
    hostname: String,
    version: String,
    serial: String,
    platform: String,
    chassis: String,
}

static NXOS_DEVICE_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Device name:\s*(\S+)").ok());

fn nxos_hostname(raw: &str) -> Option<String> {
    NXOS_DEVICE_NAME
        .as_ref()?
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn vlans(device: &str, table: VlanTable) -> Option<Vec<VlanFact>> {
    let entries = table.vlans?;
    Some(
        entries
            .into_iter()
            .filter_map(|(vid, entry)| match vid.trim().parse::<u16>() {
                Ok(vid) if (1..=4094).contains(&vid) => Some(VlanFact {
                    vid,
                    name: entry.name,
                }),
                _ => {
                    warn!(device, vid = %vid, "ignoring VLAN with invalid id");
                    None
                }
            })
            .collect(),
    )
}

fn interfaces(device: &str, table: InterfaceTable) -> Vec<InterfaceFact> {
    table
        .interfaces
        .into_iter()
        .map(|(name, entry)| {
            let addresses = entry
                .ipv4
                .into_iter()
                .filter_map(|(key, v4)| {
                    let ip = v4.ip.unwrap_or(key);
                    match (ip.parse::<Ipv4Addr>(), v4.prefix_length.value()) {
                        (Ok(ip), Some(len)) => Some(format!("{ip}/{len}")),
                        _ => {
                            warn!(device, interface = %name, %ip, "ignoring malformed IPv4 entry");
                            None
                        }
                    }
                })
                .collect();
            InterfaceFact {
                name,
                status: entry.status,
                description: entry.name,
                media: entry.media,
                addresses,
            }
        })
        .collect()
}

fn neighbors(device: &str, table: CdpTable) -> Vec<CdpNeighbor> {
    let Some(index) = table.index else {
        return Vec::new();
    };
    let or_na = |v: Option<String>| v.unwrap_or_else(|| NOT_AVAILABLE.to_string());

    index
        .into_values()
        .map(|entry| {
            let platform = or_na(entry.platform);
            let device_type = platform
                .strip_prefix("cisco ")
                .unwrap_or(&platform)
                .to_string();
            let management_ip = entry.management_addresses.keys().next().and_then(|addr| {
                addr.parse::<Ipv4Addr>()
                    .inspect_err(|_| {
                        warn!(device, %addr, "ignoring non-IPv4 CDP management address");
                    })
                    .ok()
            });
            CdpNeighbor {
                device_id: or_na(entry.device_id),
                capabilities: or_na(entry.capabilities),
                device_type,
                local_interface: or_na(entry.local_interface),
                port_id: or_na(entry.port_id),
                native_vlan: entry.native_vlan,
                software_version: or_na(entry.software_version),
                management_ip,
            }
        })
        .collect()
}
