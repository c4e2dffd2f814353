//! Interaction bus adapters.
//!
//! - `InMemoryInteractionBus` - In-process bus with concurrent handler delivery

mod in_memory;

pub use in_memory::InMemoryInteractionBus;
