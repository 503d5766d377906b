//! In-process blob store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::BlobStore;
use crate::error::{AppError, AppResult};

#[derive(Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    rejected_suffixes: Mutex<Vec<String>>,
}

impl MemoryStore {
    /// Make every subsequent `set` fail (exercises the no-partial-mutation path)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make writes fail only for keys ending in `suffix`
    pub async fn reject_writes_to(&self, suffix: &str) {
        self.rejected_suffixes.lock().await.push(suffix.to_string());
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.blobs.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let rejected = self
            .rejected_suffixes
            .lock()
            .await
            .iter()
            .any(|suffix| key.ends_with(suffix.as_str()));
        if rejected || self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Store(format!("write to {} rejected", key)));
        }
        self.blobs.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
