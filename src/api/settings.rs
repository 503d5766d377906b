//! Theme settings endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, models::Theme, AppState};

use super::CurrentUser;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThemeSetting {
    pub theme: Theme,
}

#[utoipa::path(
    get,
    path = "/settings/theme",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current theme", body = ThemeSetting)
    )
)]
pub async fn get_theme(State(state): State<AppState>, _current: CurrentUser) -> Json<ThemeSetting> {
    Json(ThemeSetting {
        theme: state.services.lab.theme().await,
    })
}

#[utoipa::path(
    put,
    path = "/settings/theme",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = ThemeSetting,
    responses(
        (status = 200, description = "Theme saved", body = ThemeSetting)
    )
)]
pub async fn update_theme(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(request): Json<ThemeSetting>,
) -> AppResult<Json<ThemeSetting>> {
    let theme = state.services.lab.set_theme(request.theme).await?;
    Ok(Json(ThemeSetting { theme }))
}

/// Switch between light and dark
#[utoipa::path(
    post,
    path = "/settings/theme/toggle",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Theme after toggling", body = ThemeSetting)
    )
)]
pub async fn toggle_theme(State(state): State<AppState>, _current: CurrentUser) -> AppResult<Json<ThemeSetting>> {
    let theme = state.services.lab.toggle_theme().await?;
    Ok(Json(ThemeSetting { theme }))
}
