// ── Interface & address reconciler ──

use netsync_api::RecordId;
use netsync_api::models::{
    AddressQuery, Device, INTERFACE_OBJECT_TYPE, Interface, InterfaceDraft, InterfacePatch,
    InterfaceQuery, IpAddress, IpAssignment,
};
use tracing::{debug, info, warn};

use super::Reconciler;
use crate::error::CoreError;
use crate::facts::InterfaceFact;
use crate::store::InventoryStore;

// ── Type inference ──────────────────────────────────────────────────

/// How [`infer_interface_type`] reads its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceMode {
    /// Exact match on a reported media/transceiver descriptor.
    Direct,
    /// Substring match on the interface-name family.
    Name,
}

/// NetBox interface type token for `spec`.
pub fn infer_interface_type(spec: &str, mode: InferenceMode) -> &'static str {
    match mode {
        InferenceMode::Direct => match spec {
            "10/100/1000BaseTX" => "1000base-tx",
            "1000BaseSX SFP" => "1000base-x-sfp",
            "10/100BaseTX" => "100base-tx",
            "SFP-10GBase-LR" | "SFP-10GBase-SR" | "SFP-10GBase-LRM" => "10gbase-x-sfpp",
            "QSFP-40G-CR" => "40gbase-x-qsfpp",
            "unknown" | "Not Present" | "--" => "other",
            _ => "virtual",
        },
        InferenceMode::Name => {
            if spec.contains("TenGigabitEthernet") {
                "10gbase-t"
            } else if spec.contains("FastEthernet") {
                "100base-tx"
            } else if spec.contains("GigabitEthernet") {
                "1000base-tx"
            } else {
                "other"
            }
        }
    }
}

impl InterfaceFact {
    /// Media type when reported, otherwise the name family.
    pub fn inferred_type(&self) -> &'static str {
        match &self.media {
            Some(media) => infer_interface_type(media, InferenceMode::Direct),
            None => infer_interface_type(&self.name, InferenceMode::Name),
        }
    }
}

/// Desired state of one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InterfaceSpec {
    pub name: String,
    pub kind: &'static str,
    pub label: String,
    pub description: String,
}

impl InterfaceSpec {
    pub fn bare(name: &str, kind: &'static str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            label: String::new(),
            description: String::new(),
        }
    }

    fn differs_from(&self, current: &Interface) -> bool {
        current.kind.as_deref() != Some(self.kind)
            || !current.enabled
            || current.label != self.label
            || current.description != self.description
    }
}

impl<S: InventoryStore> Reconciler<'_, S> {
    /// Ensure every reported interface under `device` and bind its
    /// addresses. One interface failing does not stop the rest.
    pub async fn sync_interfaces(
        &self,
        device: &Device,
        interfaces: &[InterfaceFact],
    ) -> Result<(), CoreError> {
        let name = device.name.as_deref().unwrap_or_default();
        if interfaces.is_empty() {
            info!(device = name, "no interface information to sync");
            return Ok(());
        }

        info!(device = name, count = interfaces.len(), "syncing interfaces");
        for fact in interfaces {
            let spec = InterfaceSpec {
                name: fact.name.clone(),
                kind: fact.inferred_type(),
                label: fact.status.clone(),
                description: fact.description.clone(),
            };
            let interface = match self.ensure_interface(device.id, &spec).await {
                Ok(interface) => interface,
                Err(e) => {
                    warn!(device = name, interface = %fact.name, error = %e, "cannot sync interface");
                    continue;
                }
            };

            for address in &fact.addresses {
                if let Err(e) = self.bind_address(address, interface.id).await {
                    warn!(device = name, interface = %fact.name, %address, error = %e, "cannot bind address");
                }
            }
        }
        Ok(())
    }

    /// Create the interface, or bring an existing one to `spec`.
    pub(crate) async fn ensure_interface(
        &self,
        device: RecordId,
        spec: &InterfaceSpec,
    ) -> Result<Interface, CoreError> {
        let query = InterfaceQuery::ByName {
            device,
            name: spec.name.clone(),
        };
        match self.store.get::<Interface>(&query).await? {
            Some(current) if !spec.differs_from(&current) => Ok(current),
            Some(current) => {
                info!(%device, interface = %spec.name, kind = spec.kind, "updating interface");
                let patch = InterfacePatch {
                    kind: spec.kind.to_string(),
                    enabled: true,
                    label: spec.label.clone(),
                    description: spec.description.clone(),
                };
                self.store.update::<Interface>(current.id, &patch).await
            }
            None => {
                info!(%device, interface = %spec.name, kind = spec.kind, "creating interface");
                self.create_interface(device, spec).await
            }
        }
    }

    /// Look the interface up by name; create it only when absent.
    pub(crate) async fn find_or_create_interface(
        &self,
        device: RecordId,
        spec: &InterfaceSpec,
    ) -> Result<Interface, CoreError> {
        let query = InterfaceQuery::ByName {
            device,
            name: spec.name.clone(),
        };
        if let Some(existing) = self.store.get::<Interface>(&query).await? {
            return Ok(existing);
        }
        info!(%device, interface = %spec.name, kind = spec.kind, "creating interface");
        self.create_interface(device, spec).await
    }

    async fn create_interface(
        &self,
        device: RecordId,
        spec: &InterfaceSpec,
    ) -> Result<Interface, CoreError> {
        let draft = InterfaceDraft {
            device,
            name: spec.name.clone(),
            kind: spec.kind.to_string(),
            enabled: true,
            label: spec.label.clone(),
            description: spec.description.clone(),
        };
        self.store.create::<Interface>(&draft).await
    }

    /// Ensure `address` exists and bind it to `interface` unless it is
    /// already bound somewhere. Bound addresses are never moved.
    pub async fn bind_address(
        &self,
        address: &str,
        interface: RecordId,
    ) -> Result<IpAddress, CoreError> {
        let ip = self.ensure_address(address).await?;
        if let Some(owner) = ip.assigned_object_id {
            debug!(address, %owner, "address already bound, leaving it");
            return Ok(ip);
        }

        info!(address, %interface, "binding address to interface");
        self.store
            .update::<IpAddress>(
                ip.id,
                &IpAssignment {
                    assigned_object_type: INTERFACE_OBJECT_TYPE.into(),
                    assigned_object_id: interface,
                },
            )
            .await
    }

    /// Whether `address` is bound to any interface. Unknown addresses
    /// count as unbound.
    pub(crate) async fn is_address_bound(&self, address: &str) -> Result<bool, CoreError> {
        Ok(self
            .store
            .get::<IpAddress>(&AddressQuery(address.to_string()))
            .await?
            .is_some_and(|ip| ip.is_assigned()))
    }
}
