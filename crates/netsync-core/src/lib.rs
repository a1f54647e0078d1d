//! Reconciliation engine that converges a NetBox inventory with facts
//! collected from Cisco switches.
//!
//! - **[`Discovery`]**: drives a run. It builds the target list from devices
//!   with the `switch` role, collects each device's facts through a
//!   [`FactsProvider`], and reconciles devices one at a time. A failing
//!   device is recorded in the [`RunSummary`] and never aborts the run.
//!
//! - **[`Reconciler`]**: the idempotent algorithms for device identity,
//!   site resolution, interfaces and address bindings, VLANs, inventory
//!   items and optic modules, and CDP topology with deduplicated cables.
//!
//! - **[`InventoryStore`]**: the store contract. [`NetboxStore`] speaks to
//!   NetBox over `netsync-api`; [`MemoryStore`] keeps records in process
//!   and enforces the same natural-key lookups.
//!
//! - **Facts** ([`facts`]): parsed command output per OS family
//!   ([`FactBundle`]) and its normalized form ([`DeviceFacts`]).

pub mod config;
pub mod engine;
pub mod error;
pub mod facts;
pub mod reconcile;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{EngineConfig, NetboxConfig, TlsVerification};
pub use engine::{DeviceOutcome, DeviceStatus, Discovery, RunSummary};
pub use error::CoreError;
pub use facts::{
    CdpNeighbor, DeviceFacts, DeviceIdentity, DeviceTarget, FactBundle, FactsProvider,
    FileFactsProvider, InterfaceFact, InventoryFacts, OsFamily, VlanFact,
};
pub use reconcile::{ColorAllocator, NeighborOutcome, Reconciler};
pub use store::{InventoryStore, MemoryStore, NetboxStore};

// Record types callers need to inspect a store.
pub use netsync_api::{RecordId, models};
