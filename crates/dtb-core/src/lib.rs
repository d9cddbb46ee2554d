//! Core of the Discord to-do bot.
//!
//! This crate is framework-agnostic. Discord lives behind ports (traits)
//! implemented in the adapter crate; everything here can be driven by fakes.

pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod router;
pub mod security;
pub mod store;
pub mod todo;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
