// ── Device reconciler ──

use std::collections::BTreeMap;

use netsync_api::RecordId;
use netsync_api::models::{Device, DeviceDraft, DevicePatch, DeviceQuery};
use serde_json::Value;
use tracing::{info, warn};

use super::Reconciler;
use crate::error::CoreError;
use crate::facts::DeviceIdentity;
use crate::store::InventoryStore;

/// Everything a device record is written with.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSpec {
    pub name: String,
    pub device_type: RecordId,
    pub platform: RecordId,
    pub role: RecordId,
    pub site: RecordId,
    /// Empty means "unknown"; an empty serial never overwrites a stored one.
    pub serial: String,
    pub custom_fields: BTreeMap<String, Value>,
}

impl<S: InventoryStore> Reconciler<'_, S> {
    /// Reconcile a switch from its own identity facts.
    ///
    /// Registers the management address (unbound), resolves the site and
    /// the reference kinds, then creates or updates the device. A stacked
    /// switch is written without a chassis serial; its members show up as
    /// inventory items instead.
    pub async fn sync_device(&self, identity: &DeviceIdentity) -> Result<Device, CoreError> {
        let name = identity.hostname.as_str();
        let address = identity.management_address();

        if let Err(e) = self.ensure_address(&address).await {
            warn!(device = name, %address, error = %e, "cannot register management address");
        }

        let site = self.resolve_site(name, &address).await;
        let device_type = self.ensure_device_type(&identity.chassis).await?;
        let platform = self.ensure_platform(&identity.platform).await?;
        let role = self.ensure_switch_role().await?;

        let serial = if identity.is_stacked() {
            info!(
                device = name,
                members = ?identity.stack_members,
                "stacked device, leaving chassis serial empty"
            );
            String::new()
        } else {
            identity.serial.clone()
        };

        self.create_or_update_device(DeviceSpec {
            name: name.to_string(),
            device_type,
            platform,
            role,
            site,
            serial,
            custom_fields: BTreeMap::from([
                ("OS".to_string(), Value::from(identity.os.label())),
                ("Version".to_string(), Value::from(identity.version.as_str())),
            ]),
        })
        .await
    }

    /// Create the device, or update only its mutable fields when a device
    /// with that name exists. Custom fields are merged key-wise.
    pub async fn create_or_update_device(&self, spec: DeviceSpec) -> Result<Device, CoreError> {
        let existing = self
            .store
            .get::<Device>(&DeviceQuery::Name(spec.name.clone()))
            .await?;

        match existing {
            Some(device) => {
                let patch = DevicePatch {
                    device_type: Some(spec.device_type),
                    platform: Some(spec.platform),
                    serial: (!spec.serial.is_empty()).then_some(spec.serial),
                    site: Some(spec.site),
                    custom_fields: spec.custom_fields,
                };
                info!(device = %spec.name, id = %device.id, "updating device");
                self.store.update::<Device>(device.id, &patch).await
            }
            None => {
                info!(device = %spec.name, site = %spec.site, "creating device");
                let draft = DeviceDraft {
                    name: spec.name,
                    device_type: spec.device_type,
                    platform: spec.platform,
                    role: spec.role,
                    site: spec.site,
                    serial: spec.serial,
                    status: "active".into(),
                    custom_fields: spec.custom_fields,
                    primary_ip4: None,
                };
                self.store.create::<Device>(&draft).await
            }
        }
    }
}
