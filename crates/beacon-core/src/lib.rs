//! `beacon-core` — shared foundation for the Beacon publishing bot.
//!
//! Holds the pieces every other crate needs: the TOML + env configuration
//! loader, the workspace error type, tracing setup, and the
//! `CommandResponse` envelope returned by every operation exposed to
//! transport adapters.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::BeaconConfig;
pub use error::{BeaconError, Result};
pub use types::CommandResponse;
