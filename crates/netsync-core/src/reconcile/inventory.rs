// ── Inventory & module reconciler ──
//
// Two phases. First, items recorded for the device whose serial is no
// longer reported are removed (by serial, store-wide). Then every
// reported part is routed: pluggable optics to a module in a bay named
// after their slot, everything else to a plain inventory item that is
// created once and never updated.

use std::collections::BTreeSet;

use netsync_api::RecordId;
use netsync_api::models::{
    Device, InventoryItem, InventoryItemDraft, InventoryItemQuery, Module, ModuleBay,
    ModuleBayDraft, ModuleBayQuery, ModuleDraft, ModulePatch, ModuleQuery,
};
use tracing::{debug, info, warn};

use super::Reconciler;
use crate::error::CoreError;
use crate::facts::InventoryFacts;
use crate::facts::raw::HardwareEntry;
use crate::store::InventoryStore;

const UNKNOWN_PART: &str = "N/A";

/// Whether a part id names a pluggable optic.
fn is_optic(part_id: &str) -> bool {
    part_id.contains("SFP")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    pub name: String,
    pub serial: String,
    pub part_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOptic {
    /// Module bay the optic sits in.
    pub bay: String,
    pub part_id: String,
    pub serial: String,
}

/// What the latest inventory facts say should exist for one device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryPlan {
    /// Every non-empty serial reported, optics included.
    pub serials: BTreeSet<String>,
    pub items: Vec<PlannedItem>,
    pub optics: Vec<PlannedOptic>,
}

impl InventoryPlan {
    /// Extract the plan for `device` according to its OS family's layout.
    ///
    /// A non-stacked switch reports itself as unit `1`; that entry is
    /// the chassis, already on the device record, and is not planned as
    /// an item.
    pub fn from_facts(facts: &InventoryFacts, device: &str, stacked: bool) -> Self {
        let mut plan = Self::default();
        match facts {
            InventoryFacts::Ios(inventory) => {
                for rp in inventory.slot.values().flat_map(|slot| slot.rp.values()) {
                    plan.note_serial(&rp.sn);
                    if stacked || rp.name != "1" {
                        plan.item(format!("{device}-{}", rp.name), &rp.sn, &rp.pid);
                    }
                    plan.subslots(rp);
                }
            }
            InventoryFacts::IosXe(inventory) => {
                for (name, entry) in &inventory.name {
                    plan.note_serial(&entry.sn);
                    if is_optic(&entry.pid) {
                        plan.optic(name, &entry.pid, &entry.sn);
                    } else if (!stacked && name == "1") || name.contains("Te") {
                        debug!(device, item = %name, "not tracked as inventory item");
                    } else {
                        plan.item(format!("{device}-{name}"), &entry.sn, &entry.pid);
                    }
                    plan.subslots(entry);
                }
            }
            InventoryFacts::NxOs(inventory) => {
                for (name, entry) in &inventory.name {
                    let Some(serial) = entry
                        .serial_number
                        .as_deref()
                        .filter(|s| !s.is_empty() && *s != UNKNOWN_PART)
                    else {
                        continue;
                    };
                    plan.note_serial(serial);
                    plan.item(
                        format!("{device}-{name}"),
                        serial,
                        entry.pid.as_deref().unwrap_or_default(),
                    );
                }
            }
        }
        plan
    }

    fn note_serial(&mut self, serial: &str) {
        if !serial.is_empty() {
            self.serials.insert(serial.to_string());
        }
    }

    fn item(&mut self, name: String, serial: &str, part_id: &str) {
        if serial.is_empty() {
            return;
        }
        let part_id = if part_id.is_empty() {
            UNKNOWN_PART
        } else {
            part_id
        };
        self.items.push(PlannedItem {
            name,
            serial: serial.to_string(),
            part_id: part_id.to_string(),
        });
    }

    fn optic(&mut self, bay: &str, part_id: &str, serial: &str) {
        if serial.is_empty() || part_id.is_empty() {
            return;
        }
        self.optics.push(PlannedOptic {
            bay: bay.to_string(),
            part_id: part_id.to_string(),
            serial: serial.to_string(),
        });
    }

    fn subslots(&mut self, entry: &HardwareEntry) {
        for (bay, pluggables) in &entry.subslot {
            for optic in pluggables.values() {
                self.note_serial(&optic.sn);
                self.optic(bay, &optic.pid, &optic.sn);
            }
        }
    }
}

impl<S: InventoryStore> Reconciler<'_, S> {
    pub async fn sync_inventory(
        &self,
        device: &Device,
        facts: &InventoryFacts,
        stacked: bool,
    ) -> Result<(), CoreError> {
        let name = device.name.as_deref().unwrap_or_default();
        let plan = InventoryPlan::from_facts(facts, name, stacked);

        // Phase 1: drop what is no longer reported.
        let stored: BTreeSet<String> = self
            .store
            .filter::<InventoryItem>(&InventoryItemQuery::Device(device.id))
            .await?
            .into_iter()
            .map(|item| item.serial)
            .filter(|serial| !serial.is_empty())
            .collect();
        for serial in stored.difference(&plan.serials) {
            if let Err(e) = self.remove_items_by_serial(serial).await {
                warn!(device = name, serial = %serial, error = %e, "cannot remove stale inventory item");
            }
        }

        // Phase 2: route what is reported.
        for optic in &plan.optics {
            if let Err(e) = self.sync_optic(device.id, optic).await {
                warn!(device = name, bay = %optic.bay, serial = %optic.serial, error = %e, "cannot sync optic");
            }
        }
        for item in &plan.items {
            if let Err(e) = self.create_item_if_missing(device.id, item).await {
                warn!(device = name, item = %item.name, error = %e, "cannot create inventory item");
            }
        }
        Ok(())
    }

    async fn remove_items_by_serial(&self, serial: &str) -> Result<(), CoreError> {
        let items = self
            .store
            .filter::<InventoryItem>(&InventoryItemQuery::Serial(serial.to_string()))
            .await?;
        for item in items {
            info!(serial, item = %item.name, "removing inventory item no longer reported");
            self.store.delete::<InventoryItem>(item.id).await?;
        }
        Ok(())
    }

    async fn create_item_if_missing(
        &self,
        device: RecordId,
        item: &PlannedItem,
    ) -> Result<(), CoreError> {
        let existing = self
            .store
            .filter::<InventoryItem>(&InventoryItemQuery::Serial(item.serial.clone()))
            .await?;
        if !existing.is_empty() {
            return Ok(());
        }

        info!(%device, item = %item.name, serial = %item.serial, "creating inventory item");
        self.store
            .create::<InventoryItem>(&InventoryItemDraft {
                device,
                name: item.name.clone(),
                manufacturer: self.config.primary_manufacturer_id,
                serial: item.serial.clone(),
                part_id: item.part_id.clone(),
            })
            .await?;
        Ok(())
    }

    /// Bay, module type and the module occupying the bay.
    async fn sync_optic(&self, device: RecordId, optic: &PlannedOptic) -> Result<Module, CoreError> {
        let bay: ModuleBay = self
            .ensure(
                &ModuleBayQuery {
                    device,
                    name: optic.bay.clone(),
                },
                || ModuleBayDraft {
                    device,
                    name: optic.bay.clone(),
                },
            )
            .await?;
        let module_type = self.ensure_module_type(&optic.part_id).await?;

        let query = ModuleQuery {
            device,
            module_bay: bay.id,
        };
        match self.store.get::<Module>(&query).await? {
            Some(module)
                if module.serial == optic.serial && module.module_type == Some(module_type) =>
            {
                Ok(module)
            }
            Some(module) => {
                info!(%device, bay = %optic.bay, serial = %optic.serial, "updating module");
                self.store
                    .update::<Module>(
                        module.id,
                        &ModulePatch {
                            serial: optic.serial.clone(),
                            module_type,
                        },
                    )
                    .await
            }
            None => {
                info!(%device, bay = %optic.bay, serial = %optic.serial, "creating module");
                self.store
                    .create::<Module>(&ModuleDraft {
                        device,
                        module_bay: bay.id,
                        module_type,
                        serial: optic.serial.clone(),
                    })
                    .await
            }
        }
    }
}
