//! Row models and DTOs, one module per table family.

pub mod pqrsd;
pub mod user;
