// ── Discovery engine ──
//
// Builds the target list from the inventory, then reconciles one device
// at a time: identity first, then VLANs, interfaces, inventory and
// neighbors. A failing device is recorded and the run moves on.

use netsync_api::models::{Device, DeviceQuery, DeviceRole, IpAddress, SlugQuery};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::facts::{DeviceFacts, DeviceTarget, FactsProvider, OsFamily};
use crate::reconcile::{ColorAllocator, NeighborOutcome, Reconciler};
use crate::store::InventoryStore;

const SWITCH_SLUG: &str = "switch";

// ── Run summary ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    /// Converged in the store.
    Synced,
    /// Facts collected and normalized; nothing written.
    Checked,
    Failed,
}

/// Result for one target.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceOutcome {
    pub device: String,
    pub os: OsFamily,
    pub status: DeviceStatus,
    pub interfaces: usize,
    pub vlans: usize,
    pub neighbors_linked: usize,
    pub neighbors_skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeviceOutcome {
    fn empty(target: &DeviceTarget, status: DeviceStatus) -> Self {
        Self {
            device: target.name.clone(),
            os: target.os,
            status,
            interfaces: 0,
            vlans: 0,
            neighbors_linked: 0,
            neighbors_skipped: 0,
            error: None,
        }
    }

    fn failed(target: &DeviceTarget, err: &CoreError) -> Self {
        Self {
            error: Some(err.to_string()),
            ..Self::empty(target, DeviceStatus::Failed)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub devices: Vec<DeviceOutcome>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.devices
            .iter()
            .filter(|d| d.status == DeviceStatus::Failed)
            .count()
    }

    pub fn succeeded(&self) -> usize {
        self.devices.len() - self.failed()
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}

// ── Discovery ───────────────────────────────────────────────────────

/// One reconciliation run over a store and a facts provider.
pub struct Discovery<'a, S, P> {
    store: &'a S,
    provider: &'a P,
    config: &'a EngineConfig,
    color_seed: Option<u64>,
}

impl<'a, S: InventoryStore, P: FactsProvider> Discovery<'a, S, P> {
    pub fn new(store: &'a S, provider: &'a P, config: &'a EngineConfig) -> Self {
        Self {
            store,
            provider,
            config,
            color_seed: None,
        }
    }

    /// Make role colors reproducible.
    #[must_use]
    pub fn with_color_seed(mut self, seed: u64) -> Self {
        self.color_seed = Some(seed);
        self
    }

    /// Devices carrying the `switch` role, with the host taken from their
    /// primary IPv4 and the OS from their `OS` custom field. Devices with
    /// no usable OS are left out.
    pub async fn targets(&self) -> Result<Vec<DeviceTarget>, CoreError> {
        let role = self
            .store
            .get::<DeviceRole>(&SlugQuery(SWITCH_SLUG.into()))
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "device role".into(),
                identifier: SWITCH_SLUG.into(),
            })?;

        let devices = self
            .store
            .filter::<Device>(&DeviceQuery::Role(role.id))
            .await?;

        let mut targets = Vec::with_capacity(devices.len());
        for device in devices {
            let Some(name) = device.name.clone() else {
                debug!(id = %device.id, "unnamed device, skipping");
                continue;
            };
            let label = device.custom_field("OS").unwrap_or_default();
            let Some(os) = OsFamily::from_label(label) else {
                let err = CoreError::UnsupportedOs {
                    device: name,
                    os: label.to_string(),
                };
                info!(error = %err, "skipping target");
                continue;
            };
            let host = self.primary_host(&device).await?;
            targets.push(DeviceTarget { name, host, os });
        }

        info!(count = targets.len(), "built target list");
        Ok(targets)
    }

    async fn primary_host(&self, device: &Device) -> Result<Option<std::net::Ipv4Addr>, CoreError> {
        let Some(id) = device.primary_ip4 else {
            return Ok(None);
        };
        Ok(self
            .store
            .fetch::<IpAddress>(id)
            .await?
            .and_then(|ip| ip.address.split('/').next()?.parse().ok()))
    }

    /// Reconcile every target in order. Never fails as a whole; per-device
    /// errors end up in the summary.
    pub async fn run(&self, targets: &[DeviceTarget]) -> RunSummary {
        let colors = self
            .color_seed
            .map_or_else(ColorAllocator::new, ColorAllocator::seeded);
        let reconciler = Reconciler::with_colors(self.store, self.config, colors);

        let mut summary = RunSummary::default();
        for target in targets {
            info!(device = %target.name, os = target.os.label(), "reconciling device");
            let outcome = match self.reconcile_device(&reconciler, target).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(device = %target.name, error = %e, "device failed");
                    DeviceOutcome::failed(target, &e)
                }
            };
            summary.devices.push(outcome);
        }

        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "run complete"
        );
        summary
    }

    /// Collect and normalize facts for every target without writing.
    pub async fn check(&self, targets: &[DeviceTarget]) -> RunSummary {
        let mut summary = RunSummary::default();
        for target in targets {
            let outcome = match self.collect(target).await {
                Ok(facts) => DeviceOutcome {
                    interfaces: facts.interfaces.len(),
                    vlans: facts.vlans.as_ref().map_or(0, Vec::len),
                    ..DeviceOutcome::empty(target, DeviceStatus::Checked)
                },
                Err(e) => {
                    error!(device = %target.name, error = %e, "facts check failed");
                    DeviceOutcome::failed(target, &e)
                }
            };
            summary.devices.push(outcome);
        }
        summary
    }

    /// Facts for one target, normalized.
    pub async fn collect(&self, target: &DeviceTarget) -> Result<DeviceFacts, CoreError> {
        let bundle = self.provider.collect(target).await?;
        bundle.normalize(target)
    }

    async fn reconcile_device(
        &self,
        reconciler: &Reconciler<'_, S>,
        target: &DeviceTarget,
    ) -> Result<DeviceOutcome, CoreError> {
        let facts = self.collect(target).await?;
        let name = facts.identity.hostname.clone();

        let device = reconciler
            .sync_device(&facts.identity)
            .await
            .map_err(|e| CoreError::MissingIdentity {
                device: target.name.clone(),
                source: Box::new(e),
            })?;

        let mut outcome = DeviceOutcome::empty(target, DeviceStatus::Synced);

        if facts.identity.os == OsFamily::NxOs && !self.config.nexus_vtp {
            info!(device = %name, "NX-OS without VTP, skipping VLANs");
        } else if let Some(vlans) = &facts.vlans {
            match reconciler.sync_vlans(vlans).await {
                Ok(()) => outcome.vlans = vlans.len(),
                Err(e) => warn!(device = %name, error = %e, "VLAN sync failed"),
            }
        } else {
            info!(device = %name, "no VLAN information");
        }

        match reconciler.sync_interfaces(&device, &facts.interfaces).await {
            Ok(()) => outcome.interfaces = facts.interfaces.len(),
            Err(e) => warn!(device = %name, error = %e, "interface sync failed"),
        }

        if let Err(e) = reconciler
            .sync_inventory(&device, &facts.inventory, facts.identity.is_stacked())
            .await
        {
            warn!(device = %name, error = %e, "inventory sync failed");
        }

        match reconciler
            .sync_neighbors(&device, facts.neighbors.as_deref())
            .await
        {
            Ok(neighbors) => {
                for n in &neighbors {
                    match n {
                        NeighborOutcome::Linked { .. } => outcome.neighbors_linked += 1,
                        NeighborOutcome::Skipped { .. } => outcome.neighbors_skipped += 1,
                    }
                }
            }
            Err(e) => warn!(device = %name, error = %e, "topology sync failed"),
        }

        Ok(outcome)
    }
}
