//! `slate-core` -- take sequencing engine for on-set camera and sound logs.
//!
//! Everything in this crate is a pure transform over an in-memory take
//! collection: no I/O, no clocks except where a caller passes one in.
//! The store crate wires these functions to persistent project state.

pub mod channel;
pub mod delta;
pub mod error;
pub mod field_value;
pub mod positions;
pub mod project;
pub mod resolver;
pub mod sequencer;
pub mod take;
pub mod take_numbers;
pub mod types;
