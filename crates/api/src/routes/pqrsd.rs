//! Route definitions for PQRSD cases.
//!
//! Mounted at `/pqrsd` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pqrsd;
use crate::state::AppState;

/// Case routes.
///
/// ```text
/// POST   /                           -> submit_case
/// GET    /                           -> list_cases (staff)
/// GET    /consulta/{tracking_number} -> lookup_case
/// GET    /estadisticas               -> public_stats
/// GET    /admin/estadisticas         -> staff_stats (staff)
/// GET    /{id}                       -> get_case (staff)
/// PUT    /{id}                       -> transition_case (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(pqrsd::submit_case).get(pqrsd::list_cases))
        .route("/consulta/{tracking_number}", get(pqrsd::lookup_case))
        .route("/estadisticas", get(pqrsd::public_stats))
        .route("/admin/estadisticas", get(pqrsd::staff_stats))
        .route("/{id}", get(pqrsd::get_case).put(pqrsd::transition_case))
}
