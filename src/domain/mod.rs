//! Domain layer: core entities and business rules.

pub mod active_thread_state;
pub mod channel;
pub mod events;
pub mod ids;
pub mod message;
pub mod message_input_state;
pub mod presence;
pub mod shell_state;
pub mod thread;
pub mod thread_list_state;
pub mod typing;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
