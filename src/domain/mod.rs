//! Domain layer containing the transport-free conversation model.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, timestamps, errors)
//! - `conversation` - Round state, prompts, matching and navigation

pub mod conversation;
pub mod foundation;
