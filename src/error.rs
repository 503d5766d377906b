//! Error types for LabMonitor server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    StoreFailure = 3,
    NoSuchInstrument = 4,
    NoSuchRecord = 5,
    BadValue = 6,
    MissingProfile = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Instrument not found: {0}")]
    InstrumentNotFound(String),

    #[error("Missing profile: {0}")]
    MissingProfile(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Store(msg) => {
                tracing::error!("Store error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::StoreFailure,
                    "Store error".to_string(),
                )
            }
            AppError::InstrumentNotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorCode::NoSuchInstrument,
                format!("Instrument with ID \"{}\" not found.", id),
            ),
            AppError::MissingProfile(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::MissingProfile, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::Store(e.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Identity provider failures.
///
/// The raw provider code is kept for logging only; callers surface
/// [`AuthError::user_message`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already in use")]
    EmailAlreadyInUse,

    #[error("weak password")]
    WeakPassword,

    #[error("federated sign-in cancelled")]
    Cancelled,

    #[error("unauthorized domain")]
    UnauthorizedDomain,

    #[error("account exists with different credential")]
    AccountExistsWithDifferentCredential,

    #[error("federated sign-in with {provider} failed: {raw}")]
    FederatedFailed { provider: String, raw: String },

    #[error("no profile for uid {0}")]
    MissingProfile(String),

    #[error("identity provider error: {0}")]
    Unexpected(String),
}

impl AuthError {
    /// Fixed text shown to the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password.".to_string(),
            AuthError::EmailAlreadyInUse => "An account with this email already exists.".to_string(),
            AuthError::WeakPassword => "Password should be at least 6 characters.".to_string(),
            AuthError::Cancelled => "Sign-in cancelled. Please try again.".to_string(),
            AuthError::UnauthorizedDomain => {
                "This domain is not authorized. Please check your identity provider settings."
                    .to_string()
            }
            AuthError::AccountExistsWithDifferentCredential => {
                "An account already exists with the same email but different sign-in method."
                    .to_string()
            }
            AuthError::FederatedFailed { provider, .. } => {
                format!("Could not sign in with {}. Please try again.", provider)
            }
            AuthError::MissingProfile(_) => "Please sign in again.".to_string(),
            AuthError::Unexpected(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        tracing::warn!("Identity error: {}", e);
        match e {
            AuthError::MissingProfile(_) => AppError::MissingProfile(e.user_message()),
            _ => AppError::Authentication(e.user_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_messages_hide_raw_codes() {
        let err = AuthError::FederatedFailed {
            provider: "GitHub".to_string(),
            raw: "INVALID_IDP_RESPONSE".to_string(),
        };
        assert_eq!(err.user_message(), "Could not sign in with GitHub. Please try again.");

        let err = AuthError::Unexpected("TOO_MANY_ATTEMPTS_TRY_LATER".to_string());
        assert!(!err.user_message().contains("TOO_MANY"));
    }

    #[test]
    fn test_auth_error_maps_to_authentication() {
        let app: AppError = AuthError::InvalidCredentials.into();
        match app {
            AppError::Authentication(msg) => assert_eq!(msg, "Invalid email or password."),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_codes_in_body() {
        let response = AppError::InstrumentNotFound("instr-9".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], ErrorCode::NoSuchInstrument as u32);
        assert_eq!(body["error"], "NoSuchInstrument");
        assert_eq!(body["message"], "Instrument with ID \"instr-9\" not found.");

        let app: AppError = AuthError::MissingProfile("uid-1".to_string()).into();
        let response = app.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], ErrorCode::MissingProfile as u32);
        assert_eq!(body["message"], "Please sign in again.");
    }
}
