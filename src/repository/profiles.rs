//! Profile documents and local accounts

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::BlobStore;
use crate::{
    error::{AppError, AppResult},
    models::user::ProfileDocument,
};

/// Credentials held by the local identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalAccount {
    pub uid: String,
    pub email: String,
    /// argon2 PHC string
    pub password_hash: String,
}

#[derive(Clone)]
pub struct ProfilesRepository {
    store: Arc<dyn BlobStore>,
    key_prefix: String,
}

impl ProfilesRepository {
    pub fn new(store: Arc<dyn BlobStore>, key_prefix: String) -> Self {
        Self { store, key_prefix }
    }

    async fn read<T: for<'de> Deserialize<'de>>(&self, key: String) -> AppResult<Option<T>> {
        match self.store.get(&key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AppError::Store(format!("Malformed document {}: {}", key, e))),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize>(&self, key: String, value: &T) -> AppResult<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Failed to serialize {}: {}", key, e)))?;
        self.store.set(&key, raw).await
    }

    /// Get the profile document `users/<uid>`
    pub async fn get(&self, uid: &str) -> AppResult<Option<ProfileDocument>> {
        self.read(format!("{}users/{}", self.key_prefix, uid)).await
    }

    pub async fn put(&self, uid: &str, profile: &ProfileDocument) -> AppResult<()> {
        self.write(format!("{}users/{}", self.key_prefix, uid), profile).await
    }

    /// Get a local account by email (case-insensitive)
    pub async fn get_account(&self, email: &str) -> AppResult<Option<LocalAccount>> {
        self.read(self.account_key(email)).await
    }

    pub async fn put_account(&self, account: &LocalAccount) -> AppResult<()> {
        self.write(self.account_key(&account.email), account).await
    }

    fn account_key(&self, email: &str) -> String {
        format!("{}accounts/{}", self.key_prefix, email.trim().to_lowercase())
    }
}
