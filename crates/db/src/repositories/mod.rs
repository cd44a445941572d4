//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod pqrsd_repo;
pub mod user_repo;

pub use pqrsd_repo::PqrsdRepo;
pub use user_repo::UserRepo;
