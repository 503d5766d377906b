//! Booking calendar endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{FixedOffset, Utc};

use crate::{
    dashboard::calendar::{CalendarPage, CalendarQuery},
    error::{AppError, AppResult},
    AppState,
};

use super::CurrentUser;

/// Bookings bucketed by day for a month, week or day page
#[utoipa::path(
    get,
    path = "/calendar",
    tag = "calendar",
    security(("bearer_auth" = [])),
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar page", body = CalendarPage),
        (status = 400, description = "Invalid offset")
    )
)]
pub async fn get_calendar(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<CalendarPage>> {
    let minutes = query.tz_offset_minutes.unwrap_or(0);
    let offset = minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| AppError::Validation(format!("Invalid UTC offset: {} minutes", minutes)))?;

    let anchor = query
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());

    let page = state
        .services
        .lab
        .calendar(query.view.unwrap_or_default(), anchor, offset)
        .await;
    Ok(Json(page))
}
