//! Domain rules for the citizen-services portal.
//!
//! This crate has no I/O. It holds the shared id/timestamp aliases, the
//! error taxonomy, role names, and the PQRSD case rules (types, statuses,
//! validation, transition policy, tracking numbers) used by the storage,
//! notification and HTTP layers.

pub mod error;
pub mod pqrsd;
pub mod roles;
pub mod tracking;
pub mod types;
