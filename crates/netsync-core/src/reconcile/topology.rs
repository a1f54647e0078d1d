// ── Topology (CDP) reconciler ──
//
// Each neighbor walks the same steps: identity, management interface,
// local and remote ports, address binding, cable. Every step is
// ensure-style, so a neighbor interrupted halfway converges next run.

use std::collections::BTreeMap;

use netsync_api::RecordId;
use netsync_api::models::{Cable, CableDraft, CableQuery, Device, Termination};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::Reconciler;
use super::device::DeviceSpec;
use super::interface::{InferenceMode, InterfaceSpec, infer_interface_type};
use super::resolve::slugify;
use crate::error::CoreError;
use crate::facts::{CdpNeighbor, OsFamily};
use crate::store::InventoryStore;

/// What happened to one neighbor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighborOutcome {
    /// Cable present (created now or earlier).
    Linked { cable: RecordId },
    /// Dropped before touching the store.
    Skipped { reason: String },
}

impl<S: InventoryStore> Reconciler<'_, S> {
    /// Reconcile every CDP neighbor of `local`.
    ///
    /// `None` means CDP is unsupported on the device and nothing is done.
    /// Otherwise loose cables are purged store-wide first. A failing
    /// neighbor is logged and the next one is processed.
    pub async fn sync_neighbors(
        &self,
        local: &Device,
        neighbors: Option<&[CdpNeighbor]>,
    ) -> Result<Vec<NeighborOutcome>, CoreError> {
        let name = local.name.as_deref().unwrap_or_default();
        let Some(neighbors) = neighbors else {
            info!(device = name, "CDP not available, skipping topology");
            return Ok(Vec::new());
        };
        if neighbors.is_empty() {
            info!(device = name, "no CDP information found");
            return Ok(Vec::new());
        }

        info!(device = name, count = neighbors.len(), "syncing CDP neighbors");
        self.purge_loose_cables().await?;

        let mut outcomes = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            match self.sync_neighbor(local, neighbor).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!(device = name, neighbor = %neighbor.device_id, error = %e, "cannot sync neighbor");
                    outcomes.push(NeighborOutcome::Skipped {
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(outcomes)
    }

    /// Delete every cable missing either termination. Returns the count.
    pub async fn purge_loose_cables(&self) -> Result<usize, CoreError> {
        let loose: Vec<Cable> = self
            .store
            .list::<Cable>()
            .await?
            .into_iter()
            .filter(Cable::is_loose)
            .collect();
        for cable in &loose {
            info!(cable = %cable.id, "removing loose cable");
            self.store.delete::<Cable>(cable.id).await?;
        }
        Ok(loose.len())
    }

    pub async fn sync_neighbor(
        &self,
        local: &Device,
        neighbor: &CdpNeighbor,
    ) -> Result<NeighborOutcome, CoreError> {
        // Filter.
        let Some(mgmt_ip) = neighbor.management_ip else {
            warn!(neighbor = %neighbor.device_id, "no management address, skipping");
            return Ok(NeighborOutcome::Skipped {
                reason: "no management address".into(),
            });
        };
        let address = format!("{mgmt_ip}/24");

        // Classify.
        let os_label = OsFamily::classify(&neighbor.software_version)
            .map_or("N/A", OsFamily::label);

        // Identity.
        self.ensure_address(&address).await?;
        let site = self.resolve_site(&neighbor.device_id, &address).await;
        let device_type = self.ensure_device_type(&neighbor.device_type).await?;
        let platform = self.ensure_platform(neighbor.platform()).await?;
        let role = if neighbor.is_switch() {
            self.ensure_switch_role().await?
        } else {
            let slug = slugify(&neighbor.capabilities, '_').to_lowercase();
            self.ensure_role(&neighbor.capabilities, &slug).await?
        };
        let remote = self
            .create_or_update_device(DeviceSpec {
                name: neighbor.device_id.clone(),
                device_type,
                platform,
                role,
                site,
                serial: String::new(),
                custom_fields: BTreeMap::from([("OS".to_string(), Value::from(os_label))]),
            })
            .await?;

        // Management interface, only while the address is unbound.
        if !self.is_address_bound(&address).await? {
            let spec = InterfaceSpec::bare(&neighbor.management_interface(), "virtual");
            self.ensure_interface(remote.id, &spec).await?;
        }

        // Ports on both ends.
        let local_port = self
            .find_or_create_interface(
                local.id,
                &InterfaceSpec::bare(
                    &neighbor.local_interface,
                    infer_interface_type(&neighbor.local_interface, InferenceMode::Name),
                ),
            )
            .await?;
        let remote_port = self
            .find_or_create_interface(
                remote.id,
                &InterfaceSpec::bare(
                    &neighbor.port_id,
                    infer_interface_type(&neighbor.port_id, InferenceMode::Name),
                ),
            )
            .await?;

        self.bind_address(&address, remote_port.id).await?;

        let cable = self.ensure_cable(local_port.id, remote_port.id).await?;
        Ok(NeighborOutcome::Linked { cable: cable.id })
    }

    /// The cable between `a` and `b` in either orientation, created with
    /// `a` on the A side when neither exists.
    pub async fn ensure_cable(&self, a: RecordId, b: RecordId) -> Result<Cable, CoreError> {
        for query in [CableQuery { a, b }, CableQuery { a: b, b: a }] {
            if let Some(cable) = self.store.get::<Cable>(&query).await? {
                debug!(cable = %cable.id, %a, %b, "cable already present");
                return Ok(cable);
            }
        }

        info!(%a, %b, "creating cable");
        self.store
            .create::<Cable>(&CableDraft {
                a_terminations: vec![Termination::interface(a)],
                b_terminations: vec![Termination::interface(b)],
                status: "connected".into(),
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::config::EngineConfig;
    use crate::store::MemoryStore;
    use netsync_api::models::{
        DeviceDraft, DeviceQuery, DeviceRole, Interface, InterfaceDraft, InterfaceQuery,
        IpAddress, Platform,
    };
    use pretty_assertions::assert_eq;

    async fn device(store: &MemoryStore, name: &str) -> Device {
        store
            .create(&DeviceDraft {
                name: name.into(),
                device_type: RecordId(100),
                platform: RecordId(101),
                role: RecordId(102),
                site: RecordId(5),
                serial: String::new(),
                status: "active".into(),
                custom_fields: BTreeMap::new(),
                primary_ip4: None,
            })
            .await
            .unwrap()
    }

    async fn interface(store: &MemoryStore, device: RecordId, name: &str) -> Interface {
        store
            .create(&InterfaceDraft {
                device,
                name: name.into(),
                kind: "1000base-tx".into(),
                enabled: true,
                label: String::new(),
                description: String::new(),
            })
            .await
            .unwrap()
    }

    fn neighbor() -> CdpNeighbor {
        CdpNeighbor {
            device_id: "SW2".into(),
            capabilities: "Switch IGMP".into(),
            device_type: "WS-C3850-24P".into(),
            local_interface: "GigabitEthernet1/0/48".into(),
            port_id: "GigabitEthernet1/0/1".into(),
            native_vlan: None,
            software_version: "Cisco IOS-XE Software, Version 16.12.4".into(),
            management_ip: Some(Ipv4Addr::new(10, 0, 0, 6)),
        }
    }

    async fn find_device(store: &MemoryStore, name: &str) -> Device {
        store
            .get::<Device>(&DeviceQuery::Name(name.into()))
            .await
            .unwrap()
            .unwrap()
    }

    async fn find_interface(store: &MemoryStore, device: RecordId, name: &str) -> Option<Interface> {
        store
            .get::<Interface>(&InterfaceQuery::ByName {
                device,
                name: name.into(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn neighbor_becomes_device_ports_and_cable() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);
        let sw1 = device(&store, "SW1").await;

        let outcome = r.sync_neighbor(&sw1, &neighbor()).await.unwrap();
        assert!(matches!(outcome, NeighborOutcome::Linked { .. }));

        let sw2 = find_device(&store, "SW2").await;
        assert_eq!(sw2.custom_field("OS"), Some("IOS-XE"));
        assert_eq!(sw2.custom_field("Version"), None);
        assert!(sw2.primary_ip4.is_none());

        let vlan1 = find_interface(&store, sw2.id, "Vlan1").await.unwrap();
        assert_eq!(vlan1.kind.as_deref(), Some("virtual"));

        let local = find_interface(&store, sw1.id, "GigabitEthernet1/0/48").await.unwrap();
        let remote = find_interface(&store, sw2.id, "GigabitEthernet1/0/1").await.unwrap();
        assert_eq!(remote.kind.as_deref(), Some("1000base-tx"));

        let ip = &store.records::<IpAddress>()[0];
        assert_eq!(ip.address, "10.0.0.6/24");
        assert_eq!(ip.assigned_object_id, Some(remote.id));

        let cables = store.records::<Cable>();
        assert_eq!(cables.len(), 1);
        assert_eq!(cables[0].a_terminations, vec![Termination::interface(local.id)]);
        assert_eq!(cables[0].b_terminations, vec![Termination::interface(remote.id)]);
        assert_eq!(cables[0].status.as_deref(), Some("connected"));

        let platforms = store.records::<Platform>();
        assert_eq!(platforms[0].name, "C3850");
        let roles = store.records::<DeviceRole>();
        assert_eq!(roles[0].slug, "switch");
    }

    #[tokio::test]
    async fn cable_seen_from_other_side_is_not_duplicated() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);
        let sw1 = device(&store, "SW1").await;
        let sw2 = device(&store, "SW2").await;
        let a = interface(&store, sw1.id, "Gi1/0/48").await;
        let b = interface(&store, sw2.id, "Gi1/0/1").await;

        let forward = r.ensure_cable(a.id, b.id).await.unwrap();
        let reverse = r.ensure_cable(b.id, a.id).await.unwrap();

        assert_eq!(forward.id, reverse.id);
        assert_eq!(store.count::<Cable>(), 1);
    }

    #[tokio::test]
    async fn native_vlan_names_management_interface() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);
        let sw1 = device(&store, "SW1").await;
        let mut n = neighbor();
        n.native_vlan = Some("20".into());

        r.sync_neighbor(&sw1, &n).await.unwrap();

        let sw2 = find_device(&store, "SW2").await;
        assert!(find_interface(&store, sw2.id, "Vlan20").await.is_some());
        assert!(find_interface(&store, sw2.id, "Vlan1").await.is_none());
    }

    #[tokio::test]
    async fn bound_address_skips_management_interface() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);
        let sw1 = device(&store, "SW1").await;

        r.sync_neighbor(&sw1, &neighbor()).await.unwrap();
        let sw2 = find_device(&store, "SW2").await;
        let mut n = neighbor();
        n.native_vlan = Some("30".into());
        r.sync_neighbor(&sw1, &n).await.unwrap();

        assert!(find_interface(&store, sw2.id, "Vlan30").await.is_none());
    }

    #[tokio::test]
    async fn neighbor_without_address_is_skipped() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);
        let sw1 = device(&store, "SW1").await;
        let mut n = neighbor();
        n.management_ip = None;

        let outcome = r.sync_neighbor(&sw1, &n).await.unwrap();

        assert!(matches!(outcome, NeighborOutcome::Skipped { .. }));
        assert_eq!(store.count::<Device>(), 1);
    }

    #[tokio::test]
    async fn non_switch_capability_gets_own_role() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);
        let sw1 = device(&store, "SW1").await;
        let mut n = neighbor();
        n.capabilities = "Trans-Bridge Source-Route-Bridge".into();
        n.device_type = "AIR-AP2802I-E-K9".into();

        r.sync_neighbor(&sw1, &n).await.unwrap();

        let roles = store.records::<DeviceRole>();
        assert_eq!(roles[0].name, "Trans-Bridge Source-Route-Bridge");
        assert_eq!(roles[0].slug, "trans-bridge_source-route-bridge");
    }

    #[tokio::test]
    async fn loose_cables_are_purged_before_neighbors() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);
        let sw1 = device(&store, "SW1").await;
        let port = interface(&store, sw1.id, "Gi1/0/2").await;
        store
            .create::<Cable>(&CableDraft {
                a_terminations: vec![Termination::interface(port.id)],
                b_terminations: vec![],
                status: "connected".into(),
            })
            .await
            .unwrap();

        let outcomes = r.sync_neighbors(&sw1, Some(&[neighbor()])).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        let cables = store.records::<Cable>();
        assert_eq!(cables.len(), 1);
        assert!(!cables[0].is_loose());
    }

    #[tokio::test]
    async fn empty_neighbor_table_leaves_loose_cables() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);
        let sw1 = device(&store, "SW1").await;
        store
            .create::<Cable>(&CableDraft {
                a_terminations: vec![],
                b_terminations: vec![],
                status: "connected".into(),
            })
            .await
            .unwrap();

        r.sync_neighbors(&sw1, Some(&[])).await.unwrap();
        r.sync_neighbors(&sw1, None).await.unwrap();

        assert_eq!(store.count::<Cable>(), 1);
    }

    #[tokio::test]
    async fn failing_neighbor_does_not_stop_the_next() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);
        let sw1 = device(&store, "SW1").await;
        let mut bad = neighbor();
        bad.device_id = "SW2".into();
        let mut good = neighbor();
        good.device_id = "SW3".into();
        good.management_ip = Some(Ipv4Addr::new(10, 0, 0, 7));
        good.local_interface = "GigabitEthernet1/0/47".into();

        // Make only SW2's address ambiguous.
        for _ in 0..2 {
            store
                .create::<IpAddress>(&netsync_api::models::IpAddressDraft {
                    address: "10.0.0.6/24".into(),
                    status: "active".into(),
                })
                .await
                .unwrap();
        }

        let outcomes = r.sync_neighbors(&sw1, Some(&[bad, good])).await.unwrap();

        assert!(matches!(outcomes[0], NeighborOutcome::Skipped { .. }));
        assert!(matches!(outcomes[1], NeighborOutcome::Linked { .. }));
        assert_eq!(store.count::<Cable>(), 1);
    }
}
