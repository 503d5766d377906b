//! API handlers for LabMonitor REST endpoints

pub mod alerts;
pub mod analytics;
pub mod assistant;
pub mod auth;
pub mod bookings;
pub mod calendar;
pub mod consumables;
pub mod health;
pub mod instruments;
pub mod maintenance;
pub mod openapi;
pub mod reports;
pub mod settings;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::user::{SessionClaims, User},
    AppState,
};

/// Extractor for the signed-in user.
///
/// The bearer token is verified and its profile is read on every request,
/// so a session whose profile disappeared is rejected as unauthenticated.
pub struct CurrentUser {
    pub user: User,
    pub claims: SessionClaims,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let auth = &state.services.auth;
        let claims = auth.verify_token(token).await?;
        let user = auth.load_profile(claims.sub.clone()).await?;

        Ok(CurrentUser { user, claims })
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/login", post(auth::login))
        .route("/auth/federated", post(auth::federated_login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Instruments
        .route(
            "/instruments",
            get(instruments::list_instruments).post(instruments::create_instrument),
        )
        .route("/instruments/bulk-status", post(instruments::bulk_update_status))
        .route("/instruments/selection", post(instruments::update_selection))
        .route(
            "/instruments/:id",
            get(instruments::get_instrument)
                .put(instruments::update_instrument)
                .delete(instruments::delete_instrument),
        )
        .route("/instruments/:id/qr", get(instruments::qr_payload))
        .route("/scan/:payload", get(instruments::scan))
        // Bookings and maintenance
        .route("/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route("/maintenance", get(maintenance::list_logs).post(maintenance::create_log))
        // Consumables
        .route("/consumables", get(consumables::list_consumables))
        .route("/consumables/:id/adjust", post(consumables::adjust_quantity))
        // Derived views
        .route("/calendar", get(calendar::get_calendar))
        .route("/analytics", get(analytics::get_analytics))
        .route("/reports/usage.csv", get(reports::usage_report))
        .route("/reports/maintenance.csv", get(reports::maintenance_report))
        .route("/alerts", get(alerts::list_notified))
        // Assistant
        .route("/assistant", post(assistant::troubleshoot))
        // Settings
        .route(
            "/settings/theme",
            get(settings::get_theme).put(settings::update_theme),
        )
        .route("/settings/theme/toggle", post(settings::toggle_theme))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
