// netsync-api: Async Rust client for the NetBox REST API

pub mod client;
mod de;
pub mod error;
pub mod models;
pub mod resource;
pub mod transport;

pub use client::NetboxClient;
pub use error::Error;
pub use resource::{Page, RecordId, Resource};
pub use transport::{TlsMode, TransportConfig};
