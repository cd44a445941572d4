//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use ventanilla_core::error::CoreError;
use ventanilla_core::roles::is_staff_role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a staff role (see [`is_staff_role`]). Rejects with 401 when
/// unauthenticated and 403 Forbidden when the role is not staff.
///
/// The token's role claim is only a first filter. The account is reloaded on
/// every call, so a deactivated, deleted or demoted account loses access
/// immediately instead of when its token expires.
///
/// ```ignore
/// async fn staff_only(RequireStaff(user): RequireStaff) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_staff_role(&user.role) {
            tracing::debug!(user_id = user.user_id, role = %user.role, "Staff role required");
            return Err(AppError::Core(CoreError::Forbidden(
                "Staff role required".into(),
            )));
        }

        let account = state
            .accounts
            .find_by_id(user.user_id)
            .await?
            .ok_or_else(|| CoreError::Unauthorized("Account no longer exists".into()))?;
        if !account.is_active {
            tracing::debug!(user_id = user.user_id, "Deactivated account rejected");
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is deactivated".into(),
            )));
        }
        if !is_staff_role(&account.role) {
            tracing::debug!(user_id = user.user_id, role = %account.role, "Account no longer staff");
            return Err(AppError::Core(CoreError::Forbidden(
                "Staff role required".into(),
            )));
        }

        Ok(RequireStaff(user))
    }
}
