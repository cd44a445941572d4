//! Well-known role name constants.
//!
//! These must match the values stored in `users.role` by the initial migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";

/// Whether a role may manage PQRSD cases (list, inspect, transition).
///
/// Only administrators count as staff for case handling; editors manage
/// published content elsewhere in the portal.
pub fn is_staff_role(role: &str) -> bool {
    role == ROLE_ADMIN
}
