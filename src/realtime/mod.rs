//! Realtime layer: push channel subscriptions and ephemeral typing/presence state.

pub mod presence;
pub mod subscriptions;
pub mod transport;
pub mod typing;

/// Returns the realtime module name for smoke checks.
pub fn module_name() -> &'static str {
    "realtime"
}
