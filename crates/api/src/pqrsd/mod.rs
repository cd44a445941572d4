//! The PQRSD case lifecycle: creation with a unique tracking number, public
//! lookup, staff listing and transitions, and aggregate statistics.
//!
//! [`CaseService`] owns the rules; handlers only translate HTTP to calls on it.

mod service;
pub mod stats;
pub mod views;

pub use service::{CaseService, TransitionRequest, MAX_LIST_LIMIT};
