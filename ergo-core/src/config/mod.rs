//! Configuration types
//!
//! Transport-agnostic settings shared by every runtime. Runtimes load them
//! from TOML with the `serde` feature enabled.

pub mod types;

pub use types::*;
