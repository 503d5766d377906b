//! Maintenance log model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A completed service event; append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceLog {
    pub id: String,
    pub instrument_id: String,
    pub date: DateTime<Utc>,
    pub technician: String,
    pub description: String,
    pub cost: Decimal,
}

/// Create maintenance log request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMaintenanceLog {
    #[validate(length(min = 1, message = "Instrument is required"))]
    pub instrument_id: String,
    pub date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Technician is required"))]
    pub technician: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cost: Decimal,
}
