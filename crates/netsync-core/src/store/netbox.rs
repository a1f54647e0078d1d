use netsync_api::{NetboxClient, RecordId, Resource, TlsMode, TransportConfig};

use super::InventoryStore;
use crate::config::{NetboxConfig, TlsVerification};
use crate::error::CoreError;

/// [`InventoryStore`] backed by a live NetBox instance.
pub struct NetboxStore {
    client: NetboxClient,
}

impl NetboxStore {
    /// Build the HTTP client from connection settings. No request is made.
    pub fn connect(config: &NetboxConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.timeout,
        };
        let client = NetboxClient::new(config.url.as_str(), &config.token, &transport)?;
        tracing::debug!(url = %client.base_url(), "netbox client ready");
        Ok(Self { client })
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

impl InventoryStore for NetboxStore {
    async fn get<R: Resource>(&self, query: &R::Query) -> Result<Option<R>, CoreError> {
        Ok(self.client.find(query).await?)
    }

    async fn fetch<R: Resource>(&self, id: RecordId) -> Result<Option<R>, CoreError> {
        Ok(self.client.fetch(id).await?)
    }

    async fn filter<R: Resource>(&self, query: &R::Query) -> Result<Vec<R>, CoreError> {
        Ok(self.client.list(&R::query_params(query)).await?)
    }

    async fn list<R: Resource>(&self) -> Result<Vec<R>, CoreError> {
        Ok(self.client.list(&[]).await?)
    }

    async fn create<R: Resource>(&self, draft: &R::Draft) -> Result<R, CoreError> {
        Ok(self.client.create(draft).await?)
    }

    async fn update<R: Resource>(&self, id: RecordId, patch: &R::Patch) -> Result<R, CoreError> {
        Ok(self.client.update(id, patch).await?)
    }

    async fn delete<R: Resource>(&self, id: RecordId) -> Result<(), CoreError> {
        Ok(self.client.delete::<R>(id).await?)
    }
}
