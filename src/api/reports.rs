//! CSV report downloads

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::{error::AppResult, AppState};

use super::CurrentUser;

fn csv_download(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// Booking usage report
#[utoipa::path(
    get,
    path = "/reports/usage.csv",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "CSV of all bookings", content_type = "text/csv", body = String),
        (status = 403, description = "Admin or Technician only")
    )
)]
pub async fn usage_report(State(state): State<AppState>, current: CurrentUser) -> AppResult<Response> {
    current.user.require_admin_pages()?;
    let csv = state.services.lab.usage_report().await;
    Ok(csv_download("instrument_usage_report.csv", csv))
}

/// Maintenance cost report
#[utoipa::path(
    get,
    path = "/reports/maintenance.csv",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "CSV of all maintenance logs", content_type = "text/csv", body = String),
        (status = 403, description = "Admin or Technician only")
    )
)]
pub async fn maintenance_report(State(state): State<AppState>, current: CurrentUser) -> AppResult<Response> {
    current.user.require_admin_pages()?;
    let csv = state.services.lab.maintenance_report().await;
    Ok(csv_download("maintenance_log_report.csv", csv))
}
