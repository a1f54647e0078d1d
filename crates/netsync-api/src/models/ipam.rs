// ── IPAM resources ──

use serde::{Deserialize, Serialize};

use crate::de::{null_as_default, option_choice, option_ref};
use crate::resource::{RecordId, Resource};

/// `scope_type` of a prefix scoped to a site.
pub const SITE_SCOPE_TYPE: &str = "dcim.site";
/// `scope_type` of a prefix scoped to a location.
pub const LOCATION_SCOPE_TYPE: &str = "dcim.location";

// ── IP address ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpAddress {
    pub id: RecordId,
    /// CIDR form, e.g. `10.0.0.5/24`.
    pub address: String,
    #[serde(default, deserialize_with = "option_choice")]
    pub status: Option<String>,
    #[serde(default)]
    pub assigned_object_type: Option<String>,
    #[serde(default, deserialize_with = "option_ref")]
    pub assigned_object_id: Option<RecordId>,
}

impl IpAddress {
    pub fn is_assigned(&self) -> bool {
        self.assigned_object_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IpAddressDraft {
    pub address: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IpAssignment {
    pub assigned_object_type: String,
    pub assigned_object_id: RecordId,
}

#[derive(Debug, Clone)]
pub struct AddressQuery(pub String);

impl Resource for IpAddress {
    const ENDPOINT: &'static str = "ipam/ip-addresses/";
    type Query = AddressQuery;
    type Draft = IpAddressDraft;
    type Patch = IpAssignment;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &AddressQuery) -> Vec<(&'static str, String)> {
        vec![("address", query.0.clone())]
    }

    fn matches(&self, query: &AddressQuery) -> bool {
        self.address == query.0
    }
}

// ── VLAN ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vlan {
    pub id: RecordId,
    pub vid: u16,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VlanDraft {
    pub vid: u16,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VlanPatch {
    pub name: String,
}

#[derive(Debug, Clone, Copy)]
pub struct VidQuery(pub u16);

impl Resource for Vlan {
    const ENDPOINT: &'static str = "ipam/vlans/";
    type Query = VidQuery;
    type Draft = VlanDraft;
    type Patch = VlanPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &VidQuery) -> Vec<(&'static str, String)> {
        vec![("vid", query.0.to_string())]
    }

    fn matches(&self, query: &VidQuery) -> bool {
        self.vid == query.0
    }
}

// ── Prefix ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefix {
    pub id: RecordId,
    pub prefix: String,
    #[serde(default)]
    pub scope_type: Option<String>,
    #[serde(default, deserialize_with = "option_ref")]
    pub scope_id: Option<RecordId>,
}

impl Prefix {
    /// The site this prefix is scoped to, if its scope is a site.
    pub fn site(&self) -> Option<RecordId> {
        match self.scope_type.as_deref() {
            Some(SITE_SCOPE_TYPE) => self.scope_id,
            _ => None,
        }
    }

    /// The location this prefix is scoped to, if its scope is a location.
    pub fn location(&self) -> Option<RecordId> {
        match self.scope_type.as_deref() {
            Some(LOCATION_SCOPE_TYPE) => self.scope_id,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrefixDraft {
    pub prefix: String,
    pub scope_type: Option<String>,
    pub scope_id: Option<RecordId>,
}

#[derive(Debug, Clone)]
pub struct PrefixQuery(pub String);

impl Resource for Prefix {
    const ENDPOINT: &'static str = "ipam/prefixes/";
    type Query = PrefixQuery;
    type Draft = PrefixDraft;
    type Patch = PrefixDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn query_params(query: &PrefixQuery) -> Vec<(&'static str, String)> {
        vec![("prefix", query.0.clone())]
    }

    fn matches(&self, query: &PrefixQuery) -> bool {
        self.prefix == query.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefix_site_scope() {
        let prefix: Prefix = serde_json::from_value(json!({
            "id": 1,
            "prefix": "10.0.0.0/24",
            "scope_type": "dcim.site",
            "scope_id": 9
        }))
        .unwrap();
        assert_eq!(prefix.site(), Some(RecordId(9)));
    }

    #[test]
    fn prefix_region_scope_has_no_site() {
        let prefix: Prefix = serde_json::from_value(json!({
            "id": 1,
            "prefix": "10.0.0.0/24",
            "scope_type": "dcim.region",
            "scope_id": 2
        }))
        .unwrap();
        assert_eq!(prefix.site(), None);
        assert_eq!(prefix.location(), None);
    }

    #[test]
    fn prefix_location_scope() {
        let prefix: Prefix = serde_json::from_value(json!({
            "id": 1,
            "prefix": "10.0.0.0/24",
            "scope_type": "dcim.location",
            "scope_id": { "id": 6, "name": "Floor 2" }
        }))
        .unwrap();
        assert_eq!(prefix.site(), None);
        assert_eq!(prefix.location(), Some(RecordId(6)));
    }

    #[test]
    fn unassigned_address() {
        let ip: IpAddress = serde_json::from_value(json!({
            "id": 3,
            "address": "10.0.0.6/24",
            "status": { "value": "active", "label": "Active" },
            "assigned_object_type": null,
            "assigned_object_id": null
        }))
        .unwrap();
        assert!(!ip.is_assigned());
    }
}
