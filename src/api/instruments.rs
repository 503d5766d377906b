//! Instrument endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dashboard::{InstrumentFilter, InstrumentQuery, Selection, SelectionAction, SelectionState},
    error::{AppError, AppResult},
    models::{
        instrument::{InstrumentInput, InstrumentSummary},
        Instrument, InstrumentStatus,
    },
    services::lab::{InstrumentDetail, InstrumentListing},
    AppState,
};

use super::CurrentUser;

/// List instruments through the filter/sort pipeline
#[utoipa::path(
    get,
    path = "/instruments",
    tag = "instruments",
    security(("bearer_auth" = [])),
    params(InstrumentQuery),
    responses(
        (status = 200, description = "Filtered instruments and known locations", body = InstrumentListing),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_instruments(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(query): Query<InstrumentQuery>,
) -> AppResult<Json<InstrumentListing>> {
    let selection = query.selected.as_deref().map(Selection::parse_list);
    let filter = InstrumentFilter::try_from(query)?;
    Ok(Json(state.services.lab.list_instruments(&filter, selection).await))
}

/// Instrument with its bookings and maintenance logs
#[utoipa::path(
    get,
    path = "/instruments/{id}",
    tag = "instruments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Instrument ID")),
    responses(
        (status = 200, description = "Instrument details", body = InstrumentDetail),
        (status = 404, description = "Instrument not found")
    )
)]
pub async fn get_instrument(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<InstrumentDetail>> {
    Ok(Json(state.services.lab.get_instrument(&id).await?))
}

/// Register an instrument
#[utoipa::path(
    post,
    path = "/instruments",
    tag = "instruments",
    security(("bearer_auth" = [])),
    request_body = InstrumentInput,
    responses(
        (status = 201, description = "Instrument created", body = Instrument),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn create_instrument(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<InstrumentInput>,
) -> AppResult<(StatusCode, Json<Instrument>)> {
    current.user.require_manage_instruments()?;
    input.validate()?;
    let instrument = state.services.lab.add_instrument(input).await?;
    Ok((StatusCode::CREATED, Json(instrument)))
}

/// Replace an instrument record
#[utoipa::path(
    put,
    path = "/instruments/{id}",
    tag = "instruments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Instrument ID")),
    request_body = InstrumentInput,
    responses(
        (status = 200, description = "Instrument updated", body = Instrument),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Instrument not found")
    )
)]
pub async fn update_instrument(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<InstrumentInput>,
) -> AppResult<Json<Instrument>> {
    current.user.require_manage_instruments()?;
    input.validate()?;
    Ok(Json(state.services.lab.update_instrument(&id, input).await?))
}

/// Delete an instrument; bookings and logs referencing it are kept
#[utoipa::path(
    delete,
    path = "/instruments/{id}",
    tag = "instruments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Instrument ID")),
    responses(
        (status = 204, description = "Instrument deleted"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Instrument not found")
    )
)]
pub async fn delete_instrument(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    current.user.require_manage_instruments()?;
    state.services.lab.delete_instrument(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkStatusRequest {
    /// Selected instrument ids
    pub ids: Vec<String>,
    pub status: InstrumentStatus,
    /// Filtered view the selection was made in; selected ids outside it are skipped
    pub view: Option<InstrumentQuery>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkStatusResponse {
    pub updated: Vec<String>,
    pub status: InstrumentStatus,
}

/// Set the status of every selected instrument
#[utoipa::path(
    post,
    path = "/instruments/bulk-status",
    tag = "instruments",
    security(("bearer_auth" = [])),
    request_body = BulkStatusRequest,
    responses(
        (status = 200, description = "Statuses updated", body = BulkStatusResponse),
        (status = 400, description = "No instrument selected"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn bulk_update_status(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<BulkStatusRequest>,
) -> AppResult<Json<BulkStatusResponse>> {
    current.user.require_manage_instruments()?;
    if request.ids.is_empty() {
        return Err(AppError::BadRequest("No instrument selected".to_string()));
    }

    let view = request.view.map(InstrumentFilter::try_from).transpose()?;
    let updated = state
        .services
        .lab
        .bulk_update_status(Selection::from_ids(request.ids), request.status, view.as_ref())
        .await?;

    Ok(Json(BulkStatusResponse {
        updated,
        status: request.status,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectionRequest {
    /// Ids selected before the action
    #[serde(default)]
    pub selected: Vec<String>,
    pub action: SelectionAction,
    /// Target of a toggle
    pub id: Option<String>,
    /// Filtered view the checkboxes belong to; the whole inventory when absent
    pub view: Option<InstrumentQuery>,
}

/// Apply a selection checkbox action
#[utoipa::path(
    post,
    path = "/instruments/selection",
    tag = "instruments",
    security(("bearer_auth" = [])),
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Selection within the view", body = SelectionState),
        (status = 400, description = "Toggle without an id or unknown status filter")
    )
)]
pub async fn update_selection(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(request): Json<SelectionRequest>,
) -> AppResult<Json<SelectionState>> {
    let filter = request
        .view
        .map(InstrumentFilter::try_from)
        .transpose()?
        .unwrap_or_default();
    let selection = state
        .services
        .lab
        .update_selection(
            Selection::from_ids(request.selected),
            request.action,
            request.id.as_deref(),
            &filter,
        )
        .await?;
    Ok(Json(selection))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QrPayload {
    /// Exact text to encode in the QR code
    pub payload: String,
    pub name: String,
    pub serial_number: String,
}

/// QR payload of an instrument
#[utoipa::path(
    get,
    path = "/instruments/{id}/qr",
    tag = "instruments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Instrument ID")),
    responses(
        (status = 200, description = "QR payload", body = QrPayload),
        (status = 404, description = "Instrument not found")
    )
)]
pub async fn qr_payload(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<QrPayload>> {
    let instrument = state
        .services
        .lab
        .find_instrument(&id)
        .await
        .ok_or_else(|| AppError::InstrumentNotFound(id.clone()))?;

    Ok(Json(QrPayload {
        payload: instrument.id,
        name: instrument.name,
        serial_number: instrument.serial_number,
    }))
}

/// Resolve a scanned QR payload
#[utoipa::path(
    get,
    path = "/scan/{payload}",
    tag = "instruments",
    security(("bearer_auth" = [])),
    params(("payload" = String, Path, description = "Decoded QR text")),
    responses(
        (status = 200, description = "Scanned instrument", body = InstrumentSummary),
        (status = 404, description = "Instrument not found")
    )
)]
pub async fn scan(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(payload): Path<String>,
) -> AppResult<Json<InstrumentSummary>> {
    let payload = payload.trim();
    match state.services.lab.find_instrument(payload).await {
        Some(instrument) => Ok(Json(InstrumentSummary::new(instrument, chrono::Utc::now()))),
        None => {
            tracing::info!(payload, "Scanned unknown instrument id");
            Err(AppError::InstrumentNotFound(payload.to_string()))
        }
    }
}
