//! Request extractors for authentication, authorization, and client identity.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated account from a JWT Bearer token.
//! - [`rbac::RequireStaff`] -- Requires a role allowed to manage cases.
//! - [`client_ip::ClientIp`] -- Best-effort address of the submitting client.
//! - [`json::AppJson`] -- JSON body with rejections mapped to [`crate::error::AppError`].

pub mod auth;
pub mod client_ip;
pub mod json;
pub mod rbac;
