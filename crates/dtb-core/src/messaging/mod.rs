//! Cross-messenger abstractions (Discord today, anything with guilds later).

pub mod port;
pub mod types;
