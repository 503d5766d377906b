//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{AuthResponse, FederatedLoginRequest, LoginRequest, SignUpRequest, User},
    AppState,
};

use super::CurrentUser;

/// Create an account and its profile
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Identity provider refused the account")
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    request.validate()?;
    let response = state.services.auth.sign_up(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    request.validate()?;
    Ok(Json(state.services.auth.log_in(request).await?))
}

/// Log in through a federated provider
#[utoipa::path(
    post,
    path = "/auth/federated",
    tag = "auth",
    request_body = FederatedLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Unsupported provider"),
        (status = 401, description = "Federated sign-in failed")
    )
)]
pub async fn federated_login(
    State(state): State<AppState>,
    Json(request): Json<FederatedLoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(state.services.auth.log_in_federated(request).await?))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(State(state): State<AppState>, current: CurrentUser) -> StatusCode {
    state.services.auth.log_out(&current.claims).await;
    StatusCode::NO_CONTENT
}

/// Get current user profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(current: CurrentUser) -> Json<User> {
    Json(current.user)
}
