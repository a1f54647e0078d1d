// ── Inventory store abstraction ──
//
// The reconcilers speak to NetBox through this trait only. `NetboxStore`
// forwards to the HTTP client; `MemoryStore` keeps records in-process and
// evaluates the same natural-key queries locally.

mod memory;
mod netbox;

use std::future::Future;

use netsync_api::{RecordId, Resource};

use crate::error::CoreError;

pub use memory::MemoryStore;
pub use netbox::NetboxStore;

/// Typed CRUD over NetBox entity kinds.
///
/// Every method is generic over [`Resource`], so a single implementation
/// serves devices, interfaces, cables and the rest alike.
pub trait InventoryStore: Send + Sync {
    /// At most one record matching `query`. More than one is
    /// [`CoreError::Ambiguous`].
    fn get<R: Resource>(
        &self,
        query: &R::Query,
    ) -> impl Future<Output = Result<Option<R>, CoreError>> + Send;

    /// A record by id.
    fn fetch<R: Resource>(
        &self,
        id: RecordId,
    ) -> impl Future<Output = Result<Option<R>, CoreError>> + Send;

    /// Every record matching `query`.
    fn filter<R: Resource>(
        &self,
        query: &R::Query,
    ) -> impl Future<Output = Result<Vec<R>, CoreError>> + Send;

    /// Every record of the kind.
    fn list<R: Resource>(&self) -> impl Future<Output = Result<Vec<R>, CoreError>> + Send;

    fn create<R: Resource>(
        &self,
        draft: &R::Draft,
    ) -> impl Future<Output = Result<R, CoreError>> + Send;

    fn update<R: Resource>(
        &self,
        id: RecordId,
        patch: &R::Patch,
    ) -> impl Future<Output = Result<R, CoreError>> + Send;

    fn delete<R: Resource>(&self, id: RecordId)
    -> impl Future<Output = Result<(), CoreError>> + Send;
}
