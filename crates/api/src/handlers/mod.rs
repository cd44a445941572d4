pub mod auth;
pub mod pqrsd;
