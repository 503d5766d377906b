//! Configuration management for LabMonitor server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Backend holding the serialized collections
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    /// Prefix prepended to every collection key
    pub key_prefix: String,
}

/// Which identity provider answers sign-up / log-in calls
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdentityBackend {
    Local,
    Remote,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    pub identity: IdentityBackend,
    /// Base URL of a REST identity toolkit (remote backend only)
    pub identity_url: String,
    pub identity_api_key: Option<String>,
    /// Redirect URI registered for federated sign-in
    pub federated_request_uri: String,
    /// Federated providers accepted by this deployment (e.g. "google", "github")
    pub federated_providers: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Where alerts go once the engine decides to fire
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertChannelKind {
    Log,
    Email,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    pub channel: AlertChannelKind,
    pub admin_email: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub smtp_from_name: Option<String>,
    pub smtp_use_tls: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub system_instruction: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables with prefix LABMONITOR_ (e.g. LABMONITOR_SERVER__PORT)
            .add_source(
                Environment::with_prefix("LABMONITOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("store.url", env::var("REDIS_URL").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .set_override_option("assistant.api_key", env::var("ASSISTANT_API_KEY").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "labmonitor:".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-this-secret-in-production".to_string(),
            jwt_expiration_hours: 24,
            identity: IdentityBackend::Local,
            identity_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            identity_api_key: None,
            federated_request_uri: "http://localhost".to_string(),
            federated_providers: vec!["google".to_string(), "github".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            channel: AlertChannelKind::Log,
            admin_email: "lab.admin@example.com".to_string(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "noreply@labmonitor.app".to_string(),
            smtp_from_name: Some("LabMonitor".to_string()),
            smtp_use_tls: true,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            system_instruction: "You are an expert lab instrument technician. A user will describe \
an issue they are having with a piece of equipment. Your task is to provide clear, concise, and safe \
troubleshooting steps. Structure your response in markdown format. Start with a brief summary of the \
likely problem, then provide a numbered list of steps to resolve it. If the problem is complex or \
requires a certified technician, state that clearly."
                .to_string(),
        }
    }
}
