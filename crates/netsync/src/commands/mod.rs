//! Command dispatch.

pub mod config_cmd;
pub mod reconcile;
pub mod targets;
