//! `slate-store` -- project and take state for the sequencing engine.
//!
//! [`store::ProjectStore`] is the single writer over every project's takes.
//! Each operation reads the current collection, runs the matching
//! `slate-core` transform, and replaces the collection with the result.
//! Snapshots are handed to [`persistence::SnapshotWriter`] without waiting.

pub mod error;
pub mod models;
pub mod persistence;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::ProjectStore;
