//! API integration tests
//!
//! The router runs in-process over the memory blob store and the local
//! identity provider.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use labmonitor_server::{
    api,
    config::AppConfig,
    repository::{memory::MemoryStore, Repository},
    services::{assistant::NOT_CONFIGURED_MESSAGE, Services},
    AppState,
};

async fn app() -> Router {
    let config = AppConfig::default();
    let repository = Repository::new(Arc::new(MemoryStore::default()), "it:");
    let services = Services::new(repository, &config).await;
    api::create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, method, uri, token, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn send_raw(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(format!("/api/v1{}", uri));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

/// Sign up a user with the given role and return its session token
async fn sign_up(app: &Router, name: &str, role: &str) -> String {
    let email = format!("{}@lab.example.com", name.to_lowercase().replace(' ', "."));
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "name": name, "email": email, "password": "pipette42", "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "sign-up failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

fn booking_body(instrument_id: &str) -> Value {
    let start = Utc::now() + Duration::hours(2);
    json!({
        "instrument_id": instrument_id,
        "start_time": start,
        "end_time": start + Duration::hours(3),
        "purpose": "Cell imaging"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_sign_up_login_and_me() {
    let app = app().await;
    sign_up(&app, "Ada Lovelace", "Researcher").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada.lovelace@lab.example.com", "password": "pipette42" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Ada Lovelace");
    assert_eq!(me["role"], "Researcher");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = app().await;
    sign_up(&app, "Ada Lovelace", "Researcher").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada.lovelace@lab.example.com", "password": "wrong-one" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password.");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = app().await;
    let token = sign_up(&app, "Grace Hopper", "Student").await;

    let (status, _) = send(&app, Method::POST, "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_federated_sign_in_is_refused() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/federated",
        None,
        Some(json!({ "provider": "google" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Sign-in cancelled. Please try again.");
}

#[tokio::test]
async fn test_instruments_require_authentication() {
    let app = app().await;
    let (status, _) = send(&app, Method::GET, "/instruments", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_filters_and_locations() {
    let app = app().await;
    let token = sign_up(&app, "Sam Student", "Student").await;

    let (status, body) = send(&app, Method::GET, "/instruments", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["locations"].as_array().unwrap().len(), 5);

    let (_, body) = send(&app, Method::GET, "/instruments?status=Offline", Some(&token), None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["instruments"][0]["id"], "instr-4");
    assert_eq!(body["instruments"][0]["maintenance_overdue"], true);

    let (_, body) = send(&app, Method::GET, "/instruments?search=spectrometer&sort=name_asc", Some(&token), None).await;
    let names: Vec<&str> = body["instruments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bruker Avance NEO", "Thermo Orbitrap"]);

    let (status, _) = send(&app, Method::GET, "/instruments?status=Broken", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_admins_manage_instruments() {
    let app = app().await;
    let tech = sign_up(&app, "Tom Tech", "Technician").await;
    let admin = sign_up(&app, "Alice Admin", "Admin").await;
    let now = Utc::now();
    let input = json!({
        "name": "Leica SP8",
        "instrument_type": "Confocal Microscope",
        "serial_number": "SN-LEICA-1",
        "location": "Lab 302",
        "status": "Available",
        "last_maintenance": now,
        "next_maintenance": now + Duration::days(120)
    });

    let (status, _) = send(&app, Method::POST, "/instruments", Some(&tech), Some(input.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(&app, Method::POST, "/instruments", Some(&admin), Some(input.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("instr-"));

    let (status, detail) = send(&app, Method::GET, &format!("/instruments/{}", id), Some(&tech), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["name"], "Leica SP8");

    let (status, _) = send(&app, Method::PUT, "/instruments/instr-missing", Some(&admin), Some(input)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/instruments/{}", id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/instruments/{}", id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_transitions_available_only() {
    let app = app().await;
    let token = sign_up(&app, "Rosalind Franklin", "Researcher").await;

    let (status, body) = send(&app, Method::POST, "/bookings", Some(&token), Some(booking_body("instr-1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["instrument_status"], "In Use");
    assert_eq!(body["booking"]["user_id"], "Rosalind Franklin");

    let (status, body) = send(&app, Method::POST, "/bookings", Some(&token), Some(booking_body("instr-3"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["instrument_status"], "Maintenance");

    let (_, bookings) = send(&app, Method::GET, "/bookings", Some(&token), None).await;
    assert_eq!(bookings.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::POST, "/bookings", Some(&token), Some(booking_body("nope"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_status_respects_view() {
    let app = app().await;
    let admin = sign_up(&app, "Alice Admin", "Admin").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/instruments/bulk-status",
        Some(&admin),
        Some(json!({
            "ids": ["instr-1", "instr-2", "instr-5"],
            "status": "Offline",
            "view": { "location": "Lab 301" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], json!(["instr-1"]));

    let (_, body) = send(&app, Method::GET, "/instruments?status=Offline", Some(&admin), None).await;
    assert_eq!(body["total"], 2);

    let (status, _) = send(
        &app,
        Method::POST,
        "/instruments/bulk-status",
        Some(&admin),
        Some(json!({ "ids": [], "status": "Offline" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stock_adjustment_and_alerts() {
    let app = app().await;
    let token = sign_up(&app, "Sam Student", "Student").await;

    let (_, alerts) = send(&app, Method::GET, "/alerts", Some(&token), None).await;
    let keys = alerts["keys"].as_array().unwrap();
    assert!(keys.contains(&json!("overdue-maintenance-instr-4")));
    assert!(keys.contains(&json!("low-stock-cons-1")));

    let (status, body) = send(
        &app,
        Method::POST,
        "/consumables/cons-1/adjust",
        Some(&token),
        Some(json!({ "delta": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 25);
    assert_eq!(body["low_stock"], false);

    let (_, alerts) = send(&app, Method::GET, "/alerts", Some(&token), None).await;
    assert!(!alerts["keys"].as_array().unwrap().contains(&json!("low-stock-cons-1")));

    let (_, body) = send(
        &app,
        Method::POST,
        "/consumables/cons-1/adjust",
        Some(&token),
        Some(json!({ "delta": -1000 })),
    )
    .await;
    assert_eq!(body["quantity"], 0);
    assert_eq!(body["low_stock"], true);

    let (status, _) = send(
        &app,
        Method::POST,
        "/consumables/cons-9/adjust",
        Some(&token),
        Some(json!({ "delta": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reports_are_csv_and_restricted() {
    let app = app().await;
    let student = sign_up(&app, "Sam Student", "Student").await;
    let tech = sign_up(&app, "Tom Tech", "Technician").await;

    let (status, _) = send_raw(&app, Method::GET, "/reports/usage.csv", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, bytes) = send_raw(&app, Method::GET, "/reports/usage.csv", Some(&tech), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "Instrument Name,User,Start Time,End Time,Duration (Hours),Purpose\r\n"
    );

    send(
        &app,
        Method::POST,
        "/maintenance",
        Some(&tech),
        Some(json!({
            "instrument_id": "instr-2",
            "date": "2024-06-02T10:00:00Z",
            "technician": "Tom Tech",
            "description": "Replaced \"ion\" source",
            "cost": "1200.00"
        })),
    )
    .await;
    let (_, bytes) = send_raw(&app, Method::GET, "/reports/maintenance.csv", Some(&tech), None).await;
    let csv = String::from_utf8(bytes).unwrap();
    assert!(csv.ends_with("Thermo Orbitrap,2024-06-02,Tom Tech,\"Replaced \"\"ion\"\" source\",1200.00\r\n"));
}

#[tokio::test]
async fn test_scan_unknown_id_reports_not_found() {
    let app = app().await;
    let token = sign_up(&app, "Sam Student", "Student").await;

    let (status, body) = send(&app, Method::GET, "/scan/instr-2", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Thermo Orbitrap");

    let (status, body) = send(&app, Method::GET, "/scan/unknown-code", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Instrument with ID \"unknown-code\" not found.");
    assert_eq!(body["error"], "NoSuchInstrument");

    let (_, body) = send(&app, Method::GET, "/instruments/instr-5/qr", Some(&token), None).await;
    assert_eq!(body["payload"], "instr-5");
}

#[tokio::test]
async fn test_calendar_day_view() {
    let app = app().await;
    let token = sign_up(&app, "Ada Lovelace", "Researcher").await;
    send(
        &app,
        Method::POST,
        "/bookings",
        Some(&token),
        Some(json!({
            "instrument_id": "instr-5",
            "start_time": "2025-03-14T09:00:00Z",
            "end_time": "2025-03-14T12:00:00Z"
        })),
    )
    .await;

    let (status, page) = send(&app, Method::GET, "/calendar?view=day&date=2025-03-14", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["previous"], "2025-03-13");
    let entries = page["cells"][0]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["instrument_name"], "Bruker Avance NEO");
    assert_eq!(entries[0]["color_slot"], 4);

    let (status, _) = send(&app, Method::GET, "/calendar?view=week&tz_offset_minutes=100000", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analytics_for_admin_pages() {
    let app = app().await;
    let admin = sign_up(&app, "Alice Admin", "Admin").await;
    let student = sign_up(&app, "Sam Student", "Student").await;

    let (status, _) = send(&app, Method::GET, "/analytics", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/analytics", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usage"].as_array().unwrap().len(), 5);
    let statuses: Vec<&str> = body["status_distribution"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["Available", "In Use", "Maintenance", "Offline"]);
}

#[tokio::test]
async fn test_theme_toggle_and_assistant() {
    let app = app().await;
    let token = sign_up(&app, "Sam Student", "Student").await;

    let (_, body) = send(&app, Method::GET, "/settings/theme", Some(&token), None).await;
    assert_eq!(body["theme"], "dark");
    let (_, body) = send(&app, Method::POST, "/settings/theme/toggle", Some(&token), None).await;
    assert_eq!(body["theme"], "light");

    let (status, body) = send(
        &app,
        Method::POST,
        "/assistant",
        Some(&token),
        Some(json!({ "problem": "The centrifuge is vibrating" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], NOT_CONFIGURED_MESSAGE);
}

#[tokio::test]
async fn test_selection_follows_narrowed_view() {
    let app = app().await;
    let token = sign_up(&app, "Sam Student", "Student").await;

    // "lab" matches Lab 301, Lab 205 and Lab 110
    let (status, state) = send(
        &app,
        Method::POST,
        "/instruments/selection",
        Some(&token),
        Some(json!({ "action": "select_all", "view": { "search": "lab" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["selected_count"], 3);
    assert_eq!(state["all_selected"], true);
    let selected: Vec<&str> = state["selected"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap())
        .collect();
    let list = selected.join(",");

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/instruments?search=lab&selected={}", list),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["selection"]["selected_count"], 3);
    assert_eq!(body["selection"]["all_selected"], true);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/instruments?search=lab&location=Lab%20205&selected={}", list),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["selection"]["selected"], json!(["instr-2"]));
    assert_eq!(body["selection"]["selected_count"], 1);
    assert_eq!(body["selection"]["all_selected"], true);

    let (_, state) = send(
        &app,
        Method::POST,
        "/instruments/selection",
        Some(&token),
        Some(json!({
            "selected": ["instr-2"],
            "action": "toggle",
            "id": "instr-2",
            "view": { "search": "lab", "location": "Lab 205" }
        })),
    )
    .await;
    assert_eq!(state["selected_count"], 0);
    assert_eq!(state["all_selected"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        "/instruments/selection",
        Some(&token),
        Some(json!({ "action": "toggle" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, "/instruments", Some(&token), None).await;
    assert!(body.get("selection").is_none());
}
