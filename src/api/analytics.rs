//! Analytics endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, services::analytics::Analytics, AppState};

use super::CurrentUser;

/// Usage hours, status distribution and maintenance cost per instrument
#[utoipa::path(
    get,
    path = "/analytics",
    tag = "analytics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Chart data", body = Analytics),
        (status = 403, description = "Admin or Technician only")
    )
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Analytics>> {
    current.user.require_admin_pages()?;
    Ok(Json(state.services.lab.analytics().await))
}
