//! Handlers for the `/pqrsd` resource.
//!
//! Submission, tracking-number lookup and public statistics are anonymous.
//! Listing, inspection, transitions and staff statistics require a staff
//! token (see [`RequireStaff`]).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ventanilla_core::pqrsd::CaseSubmission;
use ventanilla_core::types::DbId;
use ventanilla_db::models::pqrsd::CaseFilter;

use crate::error::AppResult;
use crate::middleware::client_ip::ClientIp;
use crate::middleware::json::AppJson;
use crate::middleware::rbac::RequireStaff;
use crate::pqrsd::TransitionRequest;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Anonymous
// ---------------------------------------------------------------------------

/// POST /api/v1/pqrsd
///
/// File a new case. Returns 201 with `{tracking_number, id}`.
pub async fn submit_case(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    AppJson(input): AppJson<CaseSubmission>,
) -> AppResult<impl IntoResponse> {
    let created = state.cases.create(&input, ip).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/pqrsd/consulta/{tracking_number}
pub async fn lookup_case(
    State(state): State<AppState>,
    Path(tracking_number): Path<String>,
) -> AppResult<impl IntoResponse> {
    let view = state.cases.lookup(&tracking_number).await?;
    Ok(Json(view))
}

/// GET /api/v1/pqrsd/estadisticas
pub async fn public_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(state.cases.public_stats().await?))
}

// ---------------------------------------------------------------------------
// Staff
// ---------------------------------------------------------------------------

/// GET /api/v1/pqrsd
///
/// Filters: `case_type`, `status`, `interest_group`, `from`, `to`
/// (`YYYY-MM-DD`, inclusive), `search`, `limit`, `offset`.
pub async fn list_cases(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Query(filter): Query<CaseFilter>,
) -> AppResult<impl IntoResponse> {
    let cases = state.cases.list(filter).await?;
    Ok(Json(cases))
}

/// GET /api/v1/pqrsd/{id}
pub async fn get_case(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(state.cases.get(id).await?))
}

/// PUT /api/v1/pqrsd/{id}
///
/// Body: `{status, response_text?, notes?}`. Returns the updated case.
pub async fn transition_case(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<TransitionRequest>,
) -> AppResult<impl IntoResponse> {
    let case = state.cases.transition(id, &input, staff.user_id).await?;
    Ok(Json(case))
}

/// GET /api/v1/pqrsd/admin/estadisticas
pub async fn staff_stats(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(state.cases.staff_stats().await?))
}
