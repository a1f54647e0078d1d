// ── DCIM resources ──
//
// Devices and everything hanging off them: reference kinds (type,
// platform, role), interfaces, cables, inventory items, and the
// module-bay/module pair used for pluggable optics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::de::{null_as_default, option_choice, option_ref};
use crate::resource::{RecordId, Resource};

fn default_true() -> bool {
    true
}

/// `assigned_object_type` / termination `object_type` for interfaces.
pub const INTERFACE_OBJECT_TYPE: &str = "dcim.interface";

// ── Device ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "option_ref")]
    pub device_type: Option<RecordId>,
    #[serde(default, deserialize_with = "option_ref")]
    pub platform: Option<RecordId>,
    #[serde(default, alias = "device_role", deserialize_with = "option_ref")]
    pub role: Option<RecordId>,
    #[serde(default, deserialize_with = "option_ref")]
    pub site: Option<RecordId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub serial: String,
    #[serde(default, deserialize_with = "option_choice")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "option_ref")]
    pub primary_ip4: Option<RecordId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_fields: BTreeMap<String, serde_json::Value>,
}

impl Device {
    /// A custom field rendered as a string, if set.
    pub fn custom_field(&self, key: &str) -> Option<&str> {
        self.custom_fields.get(key).and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceDraft {
    pub name: String,
    pub device_type: RecordId,
    pub platform: RecordId,
    pub role: RecordId,
    pub site: RecordId,
    pub serial: String,
    pub status: String,
    pub custom_fields: BTreeMap<String, serde_json::Value>,
    pub primary_ip4: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DevicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<RecordId>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub enum DeviceQuery {
    Name(String),
    Role(RecordId),
}

impl Resource for Device {
    const ENDPOINT: &'static str = "dcim/devices/";
    type Query = DeviceQuery;
    type Draft = DeviceDraft;
    type Patch = DevicePatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &DeviceQuery) -> Vec<(&'static str, String)> {
        match query {
            DeviceQuery::Name(name) => vec![("name", name.clone())],
            DeviceQuery::Role(role) => vec![("role_id", role.to_string())],
        }
    }

    fn matches(&self, query: &DeviceQuery) -> bool {
        match query {
            DeviceQuery::Name(name) => self.name.as_deref() == Some(name.as_str()),
            DeviceQuery::Role(role) => self.role == Some(*role),
        }
    }
}

// ── Reference kinds keyed by slug ───────────────────────────────────

#[derive(Debug, Clone)]
pub struct SlugQuery(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: RecordId,
    pub model: String,
    pub slug: String,
    #[serde(default, deserialize_with = "option_ref")]
    pub manufacturer: Option<RecordId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceTypeDraft {
    pub model: String,
    pub slug: String,
    pub manufacturer: RecordId,
}

impl Resource for DeviceType {
    const ENDPOINT: &'static str = "dcim/device-types/";
    type Query = SlugQuery;
    type Draft = DeviceTypeDraft;
    type Patch = DeviceTypeDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &SlugQuery) -> Vec<(&'static str, String)> {
        vec![("slug", query.0.clone())]
    }

    fn matches(&self, query: &SlugQuery) -> bool {
        self.slug == query.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: RecordId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformDraft {
    pub name: String,
    pub slug: String,
}

impl Resource for Platform {
    const ENDPOINT: &'static str = "dcim/platforms/";
    type Query = SlugQuery;
    type Draft = PlatformDraft;
    type Patch = PlatformDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &SlugQuery) -> Vec<(&'static str, String)> {
        vec![("slug", query.0.clone())]
    }

    fn matches(&self, query: &SlugQuery) -> bool {
        self.slug == query.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRole {
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceRoleDraft {
    pub name: String,
    pub slug: String,
    pub color: String,
}

impl Resource for DeviceRole {
    const ENDPOINT: &'static str = "dcim/device-roles/";
    type Query = SlugQuery;
    type Draft = DeviceRoleDraft;
    type Patch = DeviceRoleDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &SlugQuery) -> Vec<(&'static str, String)> {
        vec![("slug", query.0.clone())]
    }

    fn matches(&self, query: &SlugQuery) -> bool {
        self.slug == query.0
    }
}

// ── Location ────────────────────────────────────────────────────────

/// A location inside a site. Only read, to place devices whose prefix
/// is scoped to a location rather than a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    #[serde(default, deserialize_with = "option_ref")]
    pub site: Option<RecordId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationDraft {
    pub name: String,
    pub slug: String,
    pub site: RecordId,
}

impl Resource for Location {
    const ENDPOINT: &'static str = "dcim/locations/";
    type Query = SlugQuery;
    type Draft = LocationDraft;
    type Patch = LocationDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &SlugQuery) -> Vec<(&'static str, String)> {
        vec![("slug", query.0.clone())]
    }

    fn matches(&self, query: &SlugQuery) -> bool {
        self.slug == query.0
    }
}

// ── Interface ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub id: RecordId,
    #[serde(default, deserialize_with = "option_ref")]
    pub device: Option<RecordId>,
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "option_choice")]
    pub kind: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceDraft {
    pub device: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub enabled: bool,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfacePatch {
    #[serde(rename = "type")]
    pub kind: String,
    pub enabled: bool,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub enum InterfaceQuery {
    ByName { device: RecordId, name: String },
    Device(RecordId),
}

impl Resource for Interface {
    const ENDPOINT: &'static str = "dcim/interfaces/";
    type Query = InterfaceQuery;
    type Draft = InterfaceDraft;
    type Patch = InterfacePatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &InterfaceQuery) -> Vec<(&'static str, String)> {
        match query {
            InterfaceQuery::ByName { device, name } => {
                vec![("device_id", device.to_string()), ("name", name.clone())]
            }
            InterfaceQuery::Device(device) => vec![("device_id", device.to_string())],
        }
    }

    fn matches(&self, query: &InterfaceQuery) -> bool {
        match query {
            InterfaceQuery::ByName { device, name } => {
                self.device == Some(*device) && self.name == *name
            }
            InterfaceQuery::Device(device) => self.device == Some(*device),
        }
    }
}

// ── Cable ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    pub object_type: String,
    pub object_id: RecordId,
}

impl Termination {
    pub fn interface(id: RecordId) -> Self {
        Self {
            object_type: INTERFACE_OBJECT_TYPE.into(),
            object_id: id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cable {
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub a_terminations: Vec<Termination>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub b_terminations: Vec<Termination>,
    #[serde(default, deserialize_with = "option_choice")]
    pub status: Option<String>,
}

impl Cable {
    /// A cable missing either side is loose.
    pub fn is_loose(&self) -> bool {
        self.a_terminations.is_empty() || self.b_terminations.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CableDraft {
    pub a_terminations: Vec<Termination>,
    pub b_terminations: Vec<Termination>,
    pub status: String,
}

/// Cable with interface `a` on the A side and `b` on the B side.
#[derive(Debug, Clone, Copy)]
pub struct CableQuery {
    pub a: RecordId,
    pub b: RecordId,
}

impl Resource for Cable {
    const ENDPOINT: &'static str = "dcim/cables/";
    type Query = CableQuery;
    type Draft = CableDraft;
    type Patch = CableDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &CableQuery) -> Vec<(&'static str, String)> {
        vec![
            ("termination_a_type", INTERFACE_OBJECT_TYPE.into()),
            ("termination_a_id", query.a.to_string()),
            ("termination_b_type", INTERFACE_OBJECT_TYPE.into()),
            ("termination_b_id", query.b.to_string()),
        ]
    }

    fn matches(&self, query: &CableQuery) -> bool {
        let on = |side: &[Termination], id: RecordId| {
            side.iter()
                .any(|t| t.object_type == INTERFACE_OBJECT_TYPE && t.object_id == id)
        };
        on(&self.a_terminations, query.a) && on(&self.b_terminations, query.b)
    }
}

// ── Inventory item ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: RecordId,
    #[serde(default, deserialize_with = "option_ref")]
    pub device: Option<RecordId>,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub serial: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub part_id: String,
    #[serde(default, deserialize_with = "option_ref")]
    pub manufacturer: Option<RecordId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryItemDraft {
    pub device: RecordId,
    pub name: String,
    pub manufacturer: RecordId,
    pub serial: String,
    pub part_id: String,
}

#[derive(Debug, Clone)]
pub enum InventoryItemQuery {
    Serial(String),
    Device(RecordId),
}

impl Resource for InventoryItem {
    const ENDPOINT: &'static str = "dcim/inventory-items/";
    type Query = InventoryItemQuery;
    type Draft = InventoryItemDraft;
    type Patch = InventoryItemDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &InventoryItemQuery) -> Vec<(&'static str, String)> {
        match query {
            InventoryItemQuery::Serial(serial) => vec![("serial", serial.clone())],
            InventoryItemQuery::Device(device) => vec![("device_id", device.to_string())],
        }
    }

    fn matches(&self, query: &InventoryItemQuery) -> bool {
        match query {
            InventoryItemQuery::Serial(serial) => self.serial == *serial,
            InventoryItemQuery::Device(device) => self.device == Some(*device),
        }
    }
}

// ── Module bay / module type / module ───────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleBay {
    pub id: RecordId,
    #[serde(default, deserialize_with = "option_ref")]
    pub device: Option<RecordId>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleBayDraft {
    pub device: RecordId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ModuleBayQuery {
    pub device: RecordId,
    pub name: String,
}

impl Resource for ModuleBay {
    const ENDPOINT: &'static str = "dcim/module-bays/";
    type Query = ModuleBayQuery;
    type Draft = ModuleBayDraft;
    type Patch = ModuleBayDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &ModuleBayQuery) -> Vec<(&'static str, String)> {
        vec![
            ("device_id", query.device.to_string()),
            ("name", query.name.clone()),
        ]
    }

    fn matches(&self, query: &ModuleBayQuery) -> bool {
        self.device == Some(query.device) && self.name == query.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleType {
    pub id: RecordId,
    pub model: String,
    #[serde(default, deserialize_with = "option_ref")]
    pub manufacturer: Option<RecordId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleTypeDraft {
    pub model: String,
    pub manufacturer: RecordId,
}

#[derive(Debug, Clone)]
pub struct ModelQuery(pub String);

impl Resource for ModuleType {
    const ENDPOINT: &'static str = "dcim/module-types/";
    type Query = ModelQuery;
    type Draft = ModuleTypeDraft;
    type Patch = ModuleTypeDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &ModelQuery) -> Vec<(&'static str, String)> {
        vec![("model", query.0.clone())]
    }

    fn matches(&self, query: &ModelQuery) -> bool {
        self.model == query.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: RecordId,
    #[serde(default, deserialize_with = "option_ref")]
    pub device: Option<RecordId>,
    #[serde(default, deserialize_with = "option_ref")]
    pub module_bay: Option<RecordId>,
    #[serde(default, deserialize_with = "option_ref")]
    pub module_type: Option<RecordId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub serial: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleDraft {
    pub device: RecordId,
    pub module_bay: RecordId,
    pub module_type: RecordId,
    pub serial: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModulePatch {
    pub serial: String,
    pub module_type: RecordId,
}

#[derive(Debug, Clone, Copy)]
pub struct ModuleQuery {
    pub device: RecordId,
    pub module_bay: RecordId,
}

impl Resource for Module {
    const ENDPOINT: &'static str = "dcim/modules/";
    type Query = ModuleQuery;
    type Draft = ModuleDraft;
    type Patch = ModulePatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &ModuleQuery) -> Vec<(&'static str, String)> {
        vec![
            ("device_id", query.device.to_string()),
            ("module_bay_id", query.module_bay.to_string()),
        ]
    }

    fn matches(&self, query: &ModuleQuery) -> bool {
        self.device == Some(query.device) && self.module_bay == Some(query.module_bay)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_from_netbox_response() {
        let device: Device = serde_json::from_value(json!({
            "id": 12,
            "name": "core-sw1",
            "device_type": { "id": 3, "model": "C9300-48P" },
            "platform": null,
            "role": { "id": 1, "slug": "switch" },
            "site": { "id": 5, "name": "HQ" },
            "serial": "FOC1234",
            "status": { "value": "active", "label": "Active" },
            "primary_ip4": null,
            "custom_fields": { "OS": "IOS-XE", "Version": null }
        }))
        .unwrap();

        assert_eq!(device.id, RecordId(12));
        assert_eq!(device.site, Some(RecordId(5)));
        assert_eq!(device.role, Some(RecordId(1)));
        assert!(device.platform.is_none());
        assert_eq!(device.custom_field("OS"), Some("IOS-XE"));
        assert_eq!(device.custom_field("Version"), None);
    }

    #[test]
    fn cable_query_is_oriented() {
        let cable = Cable {
            id: RecordId(1),
            a_terminations: vec![Termination::interface(RecordId(10))],
            b_terminations: vec![Termination::interface(RecordId(20))],
            status: Some("connected".into()),
        };
        let forward = CableQuery {
            a: RecordId(10),
            b: RecordId(20),
        };
        let reverse = CableQuery {
            a: RecordId(20),
            b: RecordId(10),
        };
        assert!(cable.matches(&forward));
        assert!(!cable.matches(&reverse));
    }

    #[test]
    fn cable_without_b_side_is_loose() {
        let cable: Cable = serde_json::from_value(json!({
            "id": 4,
            "a_terminations": [{ "object_type": "dcim.interface", "object_id": 3 }],
            "b_terminations": []
        }))
        .unwrap();
        assert!(cable.is_loose());
    }

    #[test]
    fn interface_type_renames() {
        let draft = InterfaceDraft {
            device: RecordId(1),
            name: "Vlan1".into(),
            kind: "virtual".into(),
            enabled: true,
            label: String::new(),
            description: String::new(),
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["type"], "virtual");
    }
}
