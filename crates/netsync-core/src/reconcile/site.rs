// ── Site resolver ──
//
// Continuity over recomputation: a device keeps the site it already has,
// then inherits from whatever its address is bound to, then from the /24
// prefix (directly, or through the location it is scoped to), and only
// then falls back to the configured default.

use std::net::Ipv4Addr;

use netsync_api::RecordId;
use netsync_api::models::{
    AddressQuery, Device, DeviceQuery, Interface, IpAddress, Location, Prefix, PrefixQuery,
};
use tracing::{debug, warn};

use super::Reconciler;
use crate::error::CoreError;
use crate::store::InventoryStore;

/// The `/24` network containing `address` (`10.1.2.3/24` -> `10.1.2.0/24`).
pub(crate) fn network_24(address: &str) -> Option<String> {
    let host = address.split('/').next()?;
    let ip: Ipv4Addr = host.parse().ok()?;
    let [a, b, c, _] = ip.octets();
    Some(format!("{a}.{b}.{c}.0/24"))
}

impl<S: InventoryStore> Reconciler<'_, S> {
    /// Site for a device named `device` managed at `address` (CIDR form).
    pub async fn resolve_site(&self, device: &str, address: &str) -> RecordId {
        let default = self.config.default_site_id;

        // (a) the device already exists: keep its site.
        match self.store.get::<Device>(&DeviceQuery::Name(device.into())).await {
            Ok(Some(Device { site: Some(site), .. })) => {
                debug!(device, %site, "site inherited from existing device");
                return site;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(device, error = %e, "device lookup failed, using default site");
                return default;
            }
        }

        // (b) the address is bound to an interface on a placed device.
        match self.site_from_binding(address).await {
            Ok(Some(site)) => {
                debug!(device, %site, address, "site inherited from address binding");
                return site;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(device, address, error = %e, "address lookup failed, using default site");
                return default;
            }
        }

        // (c) a /24 prefix scoped to a site or to a location in one.
        if let Some(network) = network_24(address) {
            match self.site_from_prefix(&network).await {
                Ok(Some(site)) => {
                    debug!(device, %site, prefix = %network, "site from prefix scope");
                    return site;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(device, prefix = %network, error = %e, "prefix lookup failed, using default site");
                    return default;
                }
            }
        }

        // (d)
        debug!(device, %default, "using default site");
        default
    }

    async fn site_from_prefix(&self, network: &str) -> Result<Option<RecordId>, CoreError> {
        let Some(prefix) = self
            .store
            .get::<Prefix>(&PrefixQuery(network.into()))
            .await?
        else {
            return Ok(None);
        };
        if let Some(site) = prefix.site() {
            return Ok(Some(site));
        }
        let Some(location) = prefix.location() else {
            return Ok(None);
        };
        Ok(self
            .store
            .fetch::<Location>(location)
            .await?
            .and_then(|l| l.site))
    }

    async fn site_from_binding(&self, address: &str) -> Result<Option<RecordId>, CoreError> {
        let Some(ip) = self
            .store
            .get::<IpAddress>(&AddressQuery(address.into()))
            .await?
        else {
            return Ok(None);
        };
        let Some(interface_id) = ip.assigned_object_id else {
            return Ok(None);
        };
        let Some(device_id) = self
            .store
            .fetch::<Interface>(interface_id)
            .await?
            .and_then(|i| i.device)
        else {
            return Ok(None);
        };
        Ok(self
            .store
            .fetch::<Device>(device_id)
            .await?
            .and_then(|d| d.site))
    }
}
