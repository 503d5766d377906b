//! Consumable stock endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::consumable::{AdjustQuantity, ConsumableSummary},
    AppState,
};

use super::CurrentUser;

#[utoipa::path(
    get,
    path = "/consumables",
    tag = "consumables",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stock levels", body = Vec<ConsumableSummary>)
    )
)]
pub async fn list_consumables(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Json<Vec<ConsumableSummary>> {
    Json(state.services.lab.list_consumables().await)
}

/// Change stock by a signed delta; never drops below zero
#[utoipa::path(
    post,
    path = "/consumables/{id}/adjust",
    tag = "consumables",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Consumable ID")),
    request_body = AdjustQuantity,
    responses(
        (status = 200, description = "Adjusted stock", body = ConsumableSummary),
        (status = 404, description = "Consumable not found")
    )
)]
pub async fn adjust_quantity(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<AdjustQuantity>,
) -> AppResult<Json<ConsumableSummary>> {
    Ok(Json(
        state
            .services
            .lab
            .adjust_consumable(&id, request.delta)
            .await?,
    ))
}
