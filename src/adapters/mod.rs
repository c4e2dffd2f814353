//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to a concrete environment:
//! - `events` - Interaction bus implementations
//! - `display` - Display gateway implementations

pub mod display;
pub mod events;

pub use display::{ConsoleDisplay, DisplayCall, RecordingDisplay};
pub use events::InMemoryInteractionBus;
