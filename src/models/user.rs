//! User profile, session claims and authentication requests

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::enums::UserRole;
use crate::error::AppError;

/// User profile; owned by the identity/profile collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// Profile document as stored under `users/<uid>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl ProfileDocument {
    pub fn into_user(self, uid: String) -> User {
        User {
            uid,
            name: self.name,
            email: self.email,
            role: self.role,
        }
    }
}

/// Sign-up request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Email/password log-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
}

/// Federated log-in request: the credential obtained from the provider's popup flow
#[derive(Debug, Deserialize, ToSchema)]
pub struct FederatedLoginRequest {
    /// Provider name ("google", "github")
    pub provider: String,
    /// Provider credential (id token or access token)
    pub credential: Option<String>,
}

/// Successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub user: User,
}

/// JWT claims of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity uid
    pub sub: String,
    /// Session id, used for revocation on logout
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

impl User {
    pub fn require_manage_instruments(&self) -> Result<(), AppError> {
        if self.role.can_manage_instruments() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    pub fn require_admin_pages(&self) -> Result<(), AppError> {
        if self.role.can_view_admin_pages() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Insufficient rights to view analytics and reports".to_string(),
            ))
        }
    }
}
