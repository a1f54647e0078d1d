// NetBox record, draft, patch and query types.

pub mod dcim;
pub mod ipam;

pub use dcim::*;
pub use ipam::*;
