//! CLI command implementations.

pub mod pull;
pub mod push;
