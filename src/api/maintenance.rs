//! Maintenance log endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{maintenance::CreateMaintenanceLog, MaintenanceLog},
    AppState,
};

use super::CurrentUser;

#[utoipa::path(
    get,
    path = "/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All maintenance logs", body = Vec<MaintenanceLog>)
    )
)]
pub async fn list_logs(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Json<Vec<MaintenanceLog>> {
    Json(state.services.lab.list_logs().await)
}

/// Record a completed service event
#[utoipa::path(
    post,
    path = "/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    request_body = CreateMaintenanceLog,
    responses(
        (status = 201, description = "Log recorded", body = MaintenanceLog),
        (status = 404, description = "Instrument not found")
    )
)]
pub async fn create_log(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(request): Json<CreateMaintenanceLog>,
) -> AppResult<(StatusCode, Json<MaintenanceLog>)> {
    request.validate()?;
    let log = state.services.lab.add_log(request).await?;
    Ok((StatusCode::CREATED, Json(log)))
}
