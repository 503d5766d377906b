//! Identity providers, profiles and sessions

use std::{collections::HashMap, sync::Arc};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::{AuthConfig, IdentityBackend},
    error::{AppError, AppResult, AuthError},
    models::{
        enums::UserRole,
        user::{
            AuthResponse, FederatedLoginRequest, LoginRequest, ProfileDocument, SessionClaims,
            SignUpRequest, User,
        },
    },
    repository::{profiles::LocalAccount, Repository},
};

/// Minimum password length accepted at sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

/// Clock leeway jsonwebtoken applies when checking `exp`
const TOKEN_LEEWAY_SECS: i64 = 60;

/// Identity returned by a federated sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// External identity provider: owns credentials, hands back a stable uid
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn sign_up(&self, email: &str, password: &str) -> Result<String, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthError>;

    async fn sign_in_federated(
        &self,
        provider: &str,
        credential: Option<String>,
    ) -> Result<FederatedIdentity, AuthError>;
}

/// Build the provider selected in configuration
pub fn provider_for(config: &AuthConfig, repository: &Repository) -> Arc<dyn IdentityProvider> {
    match config.identity {
        IdentityBackend::Local => Arc::new(LocalIdentityProvider::new(repository.clone())),
        IdentityBackend::Remote => Arc::new(RemoteIdentityProvider::new(config)),
    }
}

// ---------------------------------------------------------------------------
// Local provider
// ---------------------------------------------------------------------------

/// Argon2 accounts kept in the blob store. Federated sign-in is not available.
#[derive(Clone)]
pub struct LocalIdentityProvider {
    repository: Repository,
}

impl LocalIdentityProvider {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Unexpected(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(hash: &str, password: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AuthError::Unexpected("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

fn store_failure(e: AppError) -> AuthError {
    AuthError::Unexpected(e.to_string())
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    fn backend_tag(&self) -> &'static str {
        "local"
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        let accounts = &self.repository.profiles;
        if accounts.get_account(email).await.map_err(store_failure)?.is_some() {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let account = LocalAccount {
            uid: Uuid::new_v4().simple().to_string(),
            email: email.trim().to_lowercase(),
            password_hash: Self::hash_password(password)?,
        };
        accounts.put_account(&account).await.map_err(store_failure)?;
        Ok(account.uid)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let account = self
            .repository
            .profiles
            .get_account(email)
            .await
            .map_err(store_failure)?
            .ok_or(AuthError::InvalidCredentials)?;

        if Self::verify_password(&account.password_hash, password)? {
            Ok(account.uid)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn sign_in_federated(
        &self,
        provider: &str,
        credential: Option<String>,
    ) -> Result<FederatedIdentity, AuthError> {
        match credential {
            None => Err(AuthError::Cancelled),
            Some(_) => {
                tracing::warn!(provider, "Federated sign-in requested on the local identity backend");
                Err(AuthError::UnauthorizedDomain)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Remote provider (REST identity toolkit)
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct RemoteIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
    request_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    need_confirmation: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map an identity toolkit error code to an [`AuthError`]
pub fn map_error_code(code: &str, provider: Option<&str>) -> AuthError {
    // codes may carry a detail suffix, e.g. "WEAK_PASSWORD : Password should be ..."
    let code = code.split(':').next().unwrap_or(code).trim();
    match code {
        "EMAIL_EXISTS" => AuthError::EmailAlreadyInUse,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            AuthError::InvalidCredentials
        }
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        "UNAUTHORIZED_DOMAIN" => AuthError::UnauthorizedDomain,
        "FEDERATED_USER_ID_ALREADY_LINKED" => AuthError::AccountExistsWithDifferentCredential,
        other => match provider {
            Some(provider) => AuthError::FederatedFailed {
                provider: provider.to_string(),
                raw: other.to_string(),
            },
            None => AuthError::Unexpected(other.to_string()),
        },
    }
}

/// Provider id and post body of a federated sign-in
fn idp_post_body(provider: &str, credential: &str) -> String {
    let token_field = match provider {
        "github" => "access_token",
        _ => "id_token",
    };
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair(token_field, credential)
        .append_pair("providerId", &format!("{}.com", provider))
        .finish()
}

/// Header carrying the API key, kept out of URLs so it never reaches error logs
pub(crate) const API_KEY_HEADER: &str = "x-goog-api-key";

impl RemoteIdentityProvider {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.identity_url.trim_end_matches('/').to_string(),
            api_key: config.identity_api_key.clone().unwrap_or_default(),
            request_uri: config.federated_request_uri.clone(),
        }
    }

    async fn call<B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
        provider: Option<&str>,
    ) -> Result<AccountResponse, AuthError> {
        let url = format!("{}/accounts:{}", self.base_url, method);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Unexpected(format!("identity request failed: {}", e.without_url())))?;

        if response.status().is_success() {
            return response.json::<AccountResponse>().await.map_err(|e| {
                AuthError::Unexpected(format!("malformed identity response: {}", e.without_url()))
            });
        }

        let status = response.status();
        match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => Err(map_error_code(&envelope.error.message, provider)),
            Err(_) => Err(AuthError::Unexpected(format!("identity provider returned {}", status))),
        }
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    fn backend_tag(&self) -> &'static str {
        "remote"
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        Ok(self.call("signUp", &body, None).await?.local_id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        Ok(self.call("signInWithPassword", &body, None).await?.local_id)
    }

    async fn sign_in_federated(
        &self,
        provider: &str,
        credential: Option<String>,
    ) -> Result<FederatedIdentity, AuthError> {
        let credential = credential.ok_or(AuthError::Cancelled)?;
        let body = IdpRequest {
            post_body: idp_post_body(provider, &credential),
            request_uri: &self.request_uri,
            return_secure_token: true,
            return_idp_credential: true,
        };
        let account = self.call("signInWithIdp", &body, Some(provider)).await?;
        if account.need_confirmation {
            return Err(AuthError::AccountExistsWithDifferentCredential);
        }

        Ok(FederatedIdentity {
            uid: account.local_id,
            email: account.email.unwrap_or_default(),
            display_name: account.display_name,
        })
    }
}

// ---------------------------------------------------------------------------
// Auth service
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    identity: Arc<dyn IdentityProvider>,
    /// Revoked session ids with their expiry (unix seconds)
    revoked: Arc<RwLock<HashMap<String, i64>>>,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig, identity: Arc<dyn IdentityProvider>) -> Self {
        tracing::info!("Using {} identity provider", identity.backend_tag());
        Self {
            repository,
            config,
            identity,
            revoked: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create the identity, write its profile once, and open a session
    pub async fn sign_up(&self, request: SignUpRequest) -> AppResult<AuthResponse> {
        let uid = self.identity.sign_up(&request.email, &request.password).await?;
        let profile = ProfileDocument {
            name: request.name,
            email: request.email,
            role: request.role,
        };
        self.repository.profiles.put(&uid, &profile).await?;

        tracing::info!(uid = %uid, role = %profile.role, "User signed up");
        self.open_session(profile.into_user(uid))
    }

    pub async fn log_in(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let uid = self.identity.sign_in(&request.email, &request.password).await?;
        let user = self.load_profile(uid).await?;
        tracing::info!(uid = %user.uid, "User logged in");
        self.open_session(user)
    }

    /// Federated sign-in; the first sign-in of an identity creates its profile
    pub async fn log_in_federated(&self, request: FederatedLoginRequest) -> AppResult<AuthResponse> {
        let provider = request.provider.trim().to_lowercase();
        if !self.config.federated_providers.iter().any(|p| p == &provider) {
            return Err(AppError::Validation(format!(
                "Unsupported sign-in provider: {}",
                request.provider
            )));
        }

        let identity = self
            .identity
            .sign_in_federated(&provider, request.credential)
            .await?;

        let user = match self.repository.profiles.get(&identity.uid).await? {
            Some(profile) => profile.into_user(identity.uid),
            None => {
                let profile = ProfileDocument {
                    name: identity
                        .display_name
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or_else(|| identity.email.clone()),
                    email: identity.email,
                    role: UserRole::FEDERATED_DEFAULT,
                };
                self.repository.profiles.put(&identity.uid, &profile).await?;
                tracing::info!(uid = %identity.uid, provider = %provider, "Profile created for federated user");
                profile.into_user(identity.uid)
            }
        };

        self.open_session(user)
    }

    /// Revoke the session behind `claims`
    pub async fn log_out(&self, claims: &SessionClaims) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        // tokens past expiry (plus validation leeway) are rejected on their own
        revoked.retain(|_, exp| *exp + TOKEN_LEEWAY_SECS >= now);
        revoked.insert(claims.jti.clone(), claims.exp);
        tracing::info!(uid = %claims.sub, revoked = revoked.len(), "User logged out");
    }

    /// Session token to claims, rejecting revoked sessions
    pub async fn verify_token(&self, token: &str) -> AppResult<SessionClaims> {
        let claims = SessionClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;
        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(AppError::Authentication("Session has ended".to_string()));
        }
        Ok(claims)
    }

    /// Profile behind a session; a session without profile is unauthenticated
    pub async fn load_profile(&self, uid: String) -> AppResult<User> {
        match self.repository.profiles.get(&uid).await? {
            Some(profile) => Ok(profile.into_user(uid)),
            None => Err(AuthError::MissingProfile(uid).into()),
        }
    }

    fn open_session(&self, user: User) -> AppResult<AuthResponse> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user.uid.clone(),
            jti: Uuid::new_v4().to_string(),
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            user,
        })
    }
}
