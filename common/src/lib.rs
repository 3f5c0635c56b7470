//! Shared building blocks for the `ansinv` crates: error types, runtime
//! configuration and host-range expansion.

pub mod config;
pub mod error;
pub mod range;
