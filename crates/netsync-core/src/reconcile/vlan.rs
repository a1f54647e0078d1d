// ── VLAN reconciler ──
//
// VLANs are global by vid. The last device to report a vid names it.

use netsync_api::models::{Vlan, VlanDraft, VlanPatch, VidQuery};
use tracing::{debug, info, warn};

use super::Reconciler;
use crate::error::CoreError;
use crate::facts::VlanFact;
use crate::store::InventoryStore;

impl<S: InventoryStore> Reconciler<'_, S> {
    pub async fn sync_vlans(&self, vlans: &[VlanFact]) -> Result<(), CoreError> {
        info!(count = vlans.len(), "syncing VLANs");
        for vlan in vlans {
            if vlan.is_factory_default() {
                debug!("skipping factory default VLAN 1");
                continue;
            }
            if let Err(e) = self.ensure_vlan(vlan).await {
                warn!(vid = vlan.vid, error = %e, "cannot sync VLAN");
            }
        }
        Ok(())
    }

    async fn ensure_vlan(&self, fact: &VlanFact) -> Result<Vlan, CoreError> {
        let name = fact.display_name();
        match self.store.get::<Vlan>(&VidQuery(fact.vid)).await? {
            Some(vlan) if vlan.name == name => Ok(vlan),
            Some(vlan) => {
                info!(vid = fact.vid, from = %vlan.name, to = %name, "renaming VLAN");
                self.store
                    .update::<Vlan>(vlan.id, &VlanPatch { name })
                    .await
            }
            None => {
                info!(vid = fact.vid, %name, "creating VLAN");
                self.store
                    .create::<Vlan>(&VlanDraft {
                        vid: fact.vid,
                        name,
                    })
                    .await
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::store::MemoryStore;

    fn vlan(vid: u16, name: Option<&str>) -> VlanFact {
        VlanFact {
            vid,
            name: name.map(Into::into),
        }
    }

    #[tokio::test]
    async fn skips_default_vlan_one() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);

        r.sync_vlans(&[vlan(1, Some("default")), vlan(20, Some("voice"))])
            .await
            .unwrap();

        let vlans = store.records::<Vlan>();
        assert_eq!(vlans.len(), 1);
        assert_eq!(vlans[0].vid, 20);
    }

    #[tokio::test]
    async fn renamed_vlan_one_is_synced() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);

        r.sync_vlans(&[vlan(1, Some("mgmt"))]).await.unwrap();

        assert_eq!(store.records::<Vlan>()[0].name, "mgmt");
    }

    #[tokio::test]
    async fn unnamed_vlan_gets_placeholder_name() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);

        r.sync_vlans(&[vlan(30, None)]).await.unwrap();

        assert_eq!(store.records::<Vlan>()[0].name, "VLAN_30");
    }

    #[tokio::test]
    async fn last_writer_names_the_vlan() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let r = Reconciler::new(&store, &config);

        r.sync_vlans(&[vlan(20, Some("voice"))]).await.unwrap();
        let before = store.created();
        r.sync_vlans(&[vlan(20, Some("phones"))]).await.unwrap();

        let vlans = store.records::<Vlan>();
        assert_eq!(vlans.len(), 1);
        assert_eq!(vlans[0].name, "phones");
        assert_eq!(store.created(), before);
    }
}
