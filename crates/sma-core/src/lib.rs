//! Core of the saved-messages agent.
//!
//! This crate is framework-agnostic: the Telegram user client lives behind the
//! ports (traits) in [`ports`] and is implemented in the adapter crate.

pub mod agent;
pub mod alias_store;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
