// ── Entity resolver ──
//
// Ensure-exists for reference kinds. Lookups go by slug (model for module
// types); an existing record is returned untouched.

use netsync_api::models::{
    AddressQuery, DeviceRole, DeviceRoleDraft, DeviceType, DeviceTypeDraft, IpAddress,
    IpAddressDraft, ModelQuery, ModuleType, ModuleTypeDraft, Platform, PlatformDraft, SlugQuery,
};
use netsync_api::{RecordId, Resource};
use tracing::info;

use super::Reconciler;
use crate::error::CoreError;
use crate::store::InventoryStore;

pub(crate) const SWITCH_ROLE: (&str, &str) = ("Switch", "switch");

/// Replace spaces with `separator`.
pub fn slugify(value: &str, separator: char) -> String {
    value.replace(' ', separator.encode_utf8(&mut [0; 4]))
}

impl<S: InventoryStore> Reconciler<'_, S> {
    /// Get by `query`, or create from `draft()` when absent.
    pub(crate) async fn ensure<R: Resource>(
        &self,
        query: &R::Query,
        draft: impl FnOnce() -> R::Draft + Send,
    ) -> Result<R, CoreError> {
        if let Some(existing) = self.store.get::<R>(query).await? {
            return Ok(existing);
        }
        let draft = draft();
        info!(endpoint = R::ENDPOINT, ?draft, "creating");
        self.store.create::<R>(&draft).await
    }

    /// Device type keyed by model, slug with `_` for spaces.
    pub async fn ensure_device_type(&self, model: &str) -> Result<RecordId, CoreError> {
        let slug = slugify(model, '_');
        let device_type: DeviceType = self
            .ensure(&SlugQuery(slug.clone()), || DeviceTypeDraft {
                model: model.to_string(),
                slug,
                manufacturer: self.config.primary_manufacturer_id,
            })
            .await?;
        Ok(device_type.id)
    }

    /// Platform keyed by name, slug with `-` for spaces.
    pub async fn ensure_platform(&self, name: &str) -> Result<RecordId, CoreError> {
        let slug = slugify(name, '-');
        let platform: Platform = self
            .ensure(&SlugQuery(slug.clone()), || PlatformDraft {
                name: name.to_string(),
                slug,
            })
            .await?;
        Ok(platform.id)
    }

    /// Role with an explicit slug. New roles get the next palette color.
    pub async fn ensure_role(&self, name: &str, slug: &str) -> Result<RecordId, CoreError> {
        let role: DeviceRole = self
            .ensure(&SlugQuery(slug.to_string()), || DeviceRoleDraft {
                name: name.to_string(),
                slug: slug.to_string(),
                color: self.next_color(),
            })
            .await?;
        Ok(role.id)
    }

    pub async fn ensure_switch_role(&self) -> Result<RecordId, CoreError> {
        let (name, slug) = SWITCH_ROLE;
        self.ensure_role(name, slug).await
    }

    /// Module type keyed by model (part id), under the generic manufacturer.
    pub async fn ensure_module_type(&self, model: &str) -> Result<RecordId, CoreError> {
        let module_type: ModuleType = self
            .ensure(&ModelQuery(model.to_string()), || ModuleTypeDraft {
                model: model.to_string(),
                manufacturer: self.config.generic_manufacturer_id,
            })
            .await?;
        Ok(module_type.id)
    }

    /// Address record in CIDR form, created `active` and unbound.
    pub async fn ensure_address(&self, address: &str) -> Result<IpAddress, CoreError> {
        self.ensure(&AddressQuery(address.to_string()), || IpAddressDraft {
            address: address.to_string(),
            status: "active".into(),
        })
        .await
    }
}
