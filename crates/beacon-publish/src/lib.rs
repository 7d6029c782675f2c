//! `beacon-publish` — trait seams to the external publishing services.
//!
//! The scheduler never talks to content generation, chain RPC or storage
//! directly; it goes through the traits defined here. Production wires in
//! the real adapters, tests wire in hand-rolled fakes. Any error a
//! collaborator returns is treated by the scheduler as a per-post failure,
//! never as a reason to stop scheduling.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{PublishError, Result};
pub use traits::{ChainRegistry, ContentStore, Poster};
pub use types::{ContentItem, PostReceipt};
