// ── Collected fact shapes ──
//
// One fact bundle per device, in the nested map shape structured CLI
// parsers emit for `show version`, `show vlan`, `show interfaces status`,
// `show inventory`, `show switch` and `show cdp neighbors detail`.
// Optional command groups are `Option` so "unsupported" stays distinct
// from "ran and found nothing".

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Everything collected from one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactBundle {
    /// Address the facts were collected over. Falls back to the target's
    /// host when absent.
    #[serde(default)]
    pub management_ip: Option<Ipv4Addr>,

    #[serde(flatten)]
    pub platform: PlatformFacts,

    #[serde(default)]
    pub vlans: Option<VlanTable>,

    #[serde(default)]
    pub interfaces: Option<InterfaceTable>,

    /// `show switch`; absent on platforms without stacking.
    #[serde(default)]
    pub switch: Option<SwitchTable>,

    /// `show cdp neighbors detail`; absent when CDP is unsupported.
    #[serde(default)]
    pub cdp: Option<CdpTable>,
}

/// OS-shaped identity and inventory facts, tagged by `os`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "os", rename_all = "lowercase")]
pub enum PlatformFacts {
    Ios {
        version: IosVersionTable,
        #[serde(default)]
        inventory: IosInventory,
    },
    Iosxe {
        version: IosVersionTable,
        #[serde(default)]
        inventory: IosXeInventory,
    },
    Nxos {
        version: NxosVersionTable,
        /// Unparsed `show version`; the hostname only appears here.
        #[serde(default)]
        version_raw: String,
        #[serde(default)]
        inventory: NxosInventory,
    },
}

// ── show version ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IosVersionTable {
    pub version: IosVersion,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IosVersion {
    pub hostname: String,
    pub os: String,
    pub version: String,
    pub chassis_sn: String,
    pub platform: String,
    pub chassis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NxosVersionTable {
    pub platform: NxosPlatform,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NxosPlatform {
    pub os: String,
    pub software: NxosSoftware,
    pub hardware: NxosHardware,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NxosSoftware {
    pub system_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NxosHardware {
    pub model: String,
    /// e.g. `"C93180YC-EX chassis"`; the model is the first word.
    pub chassis: String,
}

// ── show vlan ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VlanTable {
    /// vid (as reported, a string) -> entry. Missing when the device
    /// reported no VLANs at all.
    #[serde(default)]
    pub vlans: Option<IndexMap<String, VlanEntry>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VlanEntry {
    #[serde(default)]
    pub name: Option<String>,
}

// ── show interfaces status ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfaceTable {
    #[serde(default)]
    pub interfaces: IndexMap<String, InterfaceEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceEntry {
    /// Line status (`connected`, `notconnect`, ...).
    pub status: String,
    /// Configured description.
    pub name: String,
    /// Reported media type (`10/100/1000BaseTX`, `SFP-10GBase-SR`, ...).
    #[serde(rename = "type")]
    pub media: Option<String>,
    /// Address -> prefix info.
    pub ipv4: IndexMap<String, Ipv4Entry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ipv4Entry {
    #[serde(default)]
    pub ip: Option<String>,
    pub prefix_length: PrefixLength,
}

/// Parsers emit the prefix length as a number or as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefixLength {
    Number(u8),
    Text(String),
}

impl PrefixLength {
    pub fn value(&self) -> Option<u8> {
        let len = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        };
        len.filter(|n| *n <= 32)
    }
}

// ── show inventory ──────────────────────────────────────────────────

/// Classic IOS: `slot -> rp -> <pid> -> {name, pid, sn, subslot}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IosInventory {
    #[serde(default)]
    pub slot: IndexMap<String, IosSlot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IosSlot {
    #[serde(default)]
    pub rp: IndexMap<String, HardwareEntry>,
}

/// IOS-XE `show inventory OID`: `name -> <name> -> {pid, sn, subslot}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IosXeInventory {
    #[serde(default)]
    pub name: IndexMap<String, HardwareEntry>,
}

/// One piece of hardware as IOS and IOS-XE report it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareEntry {
    pub name: String,
    pub descr: String,
    pub pid: String,
    pub sn: String,
    /// Subslot name -> (key -> pluggable).
    pub subslot: IndexMap<String, IndexMap<String, HardwareEntry>>,
}

/// NX-OS: `name -> <name> -> {pid, serial_number}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NxosInventory {
    #[serde(default)]
    pub name: IndexMap<String, NxosHardwareEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NxosHardwareEntry {
    pub description: String,
    pub pid: Option<String>,
    pub serial_number: Option<String>,
}

// ── show switch ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchTable {
    #[serde(default)]
    pub switch: SwitchStack,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchStack {
    /// Member number -> member details (unused beyond counting).
    #[serde(default)]
    pub stack: BTreeMap<String, serde_json::Value>,
}

// ── show cdp neighbors detail ───────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CdpTable {
    /// Missing when CDP ran but saw nobody.
    #[serde(default)]
    pub index: Option<IndexMap<String, CdpEntry>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CdpEntry {
    pub device_id: Option<String>,
    pub capabilities: Option<String>,
    pub platform: Option<String>,
    pub local_interface: Option<String>,
    pub port_id: Option<String>,
    pub native_vlan: Option<String>,
    pub software_version: Option<String>,
    /// Address -> details; the first key wins.
    pub management_addresses: IndexMap<String, serde_json::Value>,
}
