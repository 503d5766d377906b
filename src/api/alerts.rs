//! Alert state endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

use super::CurrentUser;

#[derive(Debug, Serialize, ToSchema)]
pub struct NotifiedResponse {
    /// Keys such as "overdue-maintenance-<id>" or "low-stock-<id>"
    pub keys: Vec<String>,
}

/// Conditions that have already been alerted on
#[utoipa::path(
    get,
    path = "/alerts",
    tag = "alerts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notified keys", body = NotifiedResponse)
    )
)]
pub async fn list_notified(State(state): State<AppState>, _current: CurrentUser) -> Json<NotifiedResponse> {
    Json(NotifiedResponse {
        keys: state.services.lab.notified_keys().await,
    })
}
