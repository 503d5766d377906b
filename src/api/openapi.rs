//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    alerts, analytics, assistant, auth, bookings, calendar, consumables, health, instruments,
    maintenance, reports, settings,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LabMonitor API",
        version = "0.3.0",
        description = "Lab equipment tracking REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::sign_up,
        auth::login,
        auth::federated_login,
        auth::logout,
        auth::me,
        // Instruments
        instruments::list_instruments,
        instruments::get_instrument,
        instruments::create_instrument,
        instruments::update_instrument,
        instruments::delete_instrument,
        instruments::bulk_update_status,
        instruments::update_selection,
        instruments::qr_payload,
        instruments::scan,
        // Bookings and maintenance
        bookings::list_bookings,
        bookings::create_booking,
        maintenance::list_logs,
        maintenance::create_log,
        // Consumables
        consumables::list_consumables,
        consumables::adjust_quantity,
        // Derived views
        calendar::get_calendar,
        analytics::get_analytics,
        reports::usage_report,
        reports::maintenance_report,
        alerts::list_notified,
        // Assistant
        assistant::troubleshoot,
        // Settings
        settings::get_theme,
        settings::update_theme,
        settings::toggle_theme,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::User,
            crate::models::user::SignUpRequest,
            crate::models::user::LoginRequest,
            crate::models::user::FederatedLoginRequest,
            crate::models::user::AuthResponse,
            crate::models::enums::UserRole,
            // Instruments
            crate::models::Instrument,
            crate::models::instrument::InstrumentInput,
            crate::models::instrument::InstrumentSummary,
            crate::models::enums::InstrumentStatus,
            crate::dashboard::InstrumentQuery,
            crate::dashboard::SortKey,
            crate::services::lab::InstrumentListing,
            crate::services::lab::InstrumentDetail,
            instruments::BulkStatusRequest,
            instruments::BulkStatusResponse,
            instruments::SelectionRequest,
            crate::dashboard::SelectionAction,
            crate::dashboard::SelectionState,
            instruments::QrPayload,
            // Bookings and maintenance
            crate::models::Booking,
            crate::models::booking::CreateBooking,
            crate::services::lab::BookingCreated,
            crate::models::MaintenanceLog,
            crate::models::maintenance::CreateMaintenanceLog,
            // Consumables
            crate::models::Consumable,
            crate::models::consumable::ConsumableSummary,
            crate::models::consumable::AdjustQuantity,
            crate::models::enums::ConsumableUnit,
            // Derived views
            crate::dashboard::calendar::CalendarView,
            crate::dashboard::calendar::CalendarQuery,
            crate::dashboard::calendar::CalendarPage,
            crate::dashboard::calendar::CalendarDay,
            crate::dashboard::calendar::CalendarEntry,
            crate::services::analytics::Analytics,
            crate::services::analytics::InstrumentUsage,
            crate::services::analytics::StatusCount,
            crate::services::analytics::InstrumentCost,
            alerts::NotifiedResponse,
            // Assistant
            assistant::AssistantRequest,
            assistant::AssistantResponse,
            // Settings
            settings::ThemeSetting,
            crate::models::enums::Theme,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "instruments", description = "Instrument inventory"),
        (name = "bookings", description = "Instrument bookings"),
        (name = "maintenance", description = "Maintenance logs"),
        (name = "consumables", description = "Consumable stock"),
        (name = "calendar", description = "Booking calendar"),
        (name = "analytics", description = "Usage analytics"),
        (name = "reports", description = "CSV reports"),
        (name = "alerts", description = "Alert state"),
        (name = "assistant", description = "AI troubleshooting"),
        (name = "settings", description = "User interface settings")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
