use std::sync::Arc;

use ventanilla_db::AccountStore;

use crate::config::ServerConfig;
use crate::pqrsd::CaseService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (read by the auth extractors and the login handler).
    pub config: Arc<ServerConfig>,
    /// Case lifecycle: creation, lookup, listing, transitions, statistics.
    pub cases: Arc<CaseService>,
    /// Staff accounts for login.
    pub accounts: Arc<dyn AccountStore>,
}
