//! Booking endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{booking::CreateBooking, Booking},
    services::lab::BookingCreated,
    AppState,
};

use super::CurrentUser;

/// List every booking
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All bookings", body = Vec<Booking>)
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Json<Vec<Booking>> {
    Json(state.services.lab.list_bookings().await)
}

/// Book an instrument for the signed-in user.
///
/// An Available instrument switches to In Use. Any other status is left
/// unchanged and the booking is recorded anyway.
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking recorded", body = BookingCreated),
        (status = 404, description = "Instrument not found")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingCreated>)> {
    request.validate()?;
    let created = state
        .services
        .lab
        .add_booking(&current.user.name, request)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}
