//! Business logic services

pub mod alerts;
pub mod analytics;
pub mod assistant;
pub mod auth;
pub mod email;
pub mod lab;
pub mod reports;

use std::sync::Arc;

use chrono::Utc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub lab: lab::LabService,
    pub assistant: assistant::AssistantService,
}

impl Services {
    /// Create all services over the given repository, loading the lab inventory
    pub async fn new(repository: Repository, config: &AppConfig) -> Self {
        let identity = auth::provider_for(&config.auth, &repository);
        let channel = email::channel_for(config.notifications.channel, &config.email);
        Self::with_parts(repository, config, identity, channel).await
    }

    /// Same as [`Services::new`] with explicit identity provider and alert channel
    pub async fn with_parts(
        repository: Repository,
        config: &AppConfig,
        identity: Arc<dyn auth::IdentityProvider>,
        channel: Arc<dyn email::AlertChannel>,
    ) -> Self {
        let lab = lab::LabService::load(
            repository.clone(),
            channel,
            config.notifications.admin_email.clone(),
            Utc::now(),
        )
        .await;

        Self {
            auth: auth::AuthService::new(repository, config.auth.clone(), identity),
            lab,
            assistant: assistant::AssistantService::new(&config.assistant),
        }
    }
}
