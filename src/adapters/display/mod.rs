//! Display gateway adapters.
//!
//! - `RecordingDisplay` - Records calls in memory for tests and embedding
//! - `ConsoleDisplay` - Prints prompts to stdout for the interactive demo

mod console;
mod recording;

pub use console::ConsoleDisplay;
pub use recording::{DisplayCall, RecordingDisplay};
