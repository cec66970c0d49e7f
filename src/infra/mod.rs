//! Infrastructure layer: adapters for config, storage, and the backend.

pub mod clock;
pub mod config;
pub mod contracts;
pub mod error;
pub mod identity;
pub mod logging;
pub mod memory_backend;
pub mod notifier;
pub mod seed;
pub mod storage_layout;

/// Returns the infra module name for smoke checks.
pub fn module_name() -> &'static str {
    "infra"
}
