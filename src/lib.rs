//! LabMonitor lab equipment tracking server
//!
//! REST JSON API for registering instruments, booking them, logging
//! maintenance, tracking consumable stock and reporting on usage.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
