// ── Reconcilers ──
//
// Each submodule adds one group of operations to `Reconciler`. All of
// them converge by ensure-or-create, bind-if-unbound and
// remove-if-stale, so repeating a run with the same facts is a no-op.

pub mod color;
mod device;
mod interface;
mod inventory;
mod resolve;
mod site;
mod topology;
mod vlan;

use std::sync::{Mutex, PoisonError};

use crate::config::EngineConfig;
use crate::store::InventoryStore;

pub use color::ColorAllocator;
pub use device::DeviceSpec;
pub use interface::{InferenceMode, infer_interface_type};
pub use inventory::{InventoryPlan, PlannedItem, PlannedOptic};
pub use resolve::slugify;
pub use topology::NeighborOutcome;

/// Reconciliation context for one run: the store, the fixed ids from
/// configuration and the role color allocator.
pub struct Reconciler<'a, S> {
    store: &'a S,
    config: &'a EngineConfig,
    colors: Mutex<ColorAllocator>,
}

impl<'a, S: InventoryStore> Reconciler<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self::with_colors(store, config, ColorAllocator::new())
    }

    pub fn with_colors(store: &'a S, config: &'a EngineConfig, colors: ColorAllocator) -> Self {
        Self {
            store,
            config,
            colors: Mutex::new(colors),
        }
    }

    pub fn store(&self) -> &S {
        self.store
    }

    fn next_color(&self) -> String {
        self.colors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .allocate()
    }
}
