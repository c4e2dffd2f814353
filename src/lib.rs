//! Chat Wizard - Conversation engine for chat bots
//!
//! This crate lets bot code write multi-window, branchable conversations as
//! sequential async logic on top of a chat platform that only delivers
//! independent interaction events (button clicks, menu selections,
//! reactions, messages).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
