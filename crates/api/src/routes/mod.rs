pub mod auth;
pub mod health;
pub mod pqrsd;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
///
/// /pqrsd                               submit (public), list (staff)
/// /pqrsd/consulta/{tracking_number}    lookup by tracking number (public)
/// /pqrsd/estadisticas                  public statistics
/// /pqrsd/admin/estadisticas            staff statistics
/// /pqrsd/{id}                          get, transition (staff)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/pqrsd", pqrsd::router())
}
