//! Instrument model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::enums::InstrumentStatus;

/// Days ahead of the due date during which maintenance counts as "due soon"
pub const MAINTENANCE_DUE_SOON_DAYS: i64 = 14;

/// A tracked piece of lab equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Instrument {
    /// Unique id, also the QR payload
    pub id: String,
    pub name: String,
    /// Instrument kind (e.g. "Confocal Microscope")
    pub instrument_type: String,
    pub serial_number: String,
    pub location: String,
    pub status: InstrumentStatus,
    pub last_maintenance: DateTime<Utc>,
    pub next_maintenance: DateTime<Utc>,
}

impl Instrument {
    pub fn from_input(id: String, input: InstrumentInput) -> Self {
        Self {
            id,
            name: input.name,
            instrument_type: input.instrument_type,
            serial_number: input.serial_number,
            location: input.location,
            status: input.status,
            last_maintenance: input.last_maintenance,
            next_maintenance: input.next_maintenance,
        }
    }

    pub fn is_maintenance_overdue(&self, now: DateTime<Utc>) -> bool {
        self.next_maintenance < now
    }

    /// Due within the next two weeks (and not yet overdue by a whole day)
    pub fn is_maintenance_due_soon(&self, now: DateTime<Utc>) -> bool {
        let diff_ms = (self.next_maintenance - now).num_milliseconds();
        let day_ms = 24 * 60 * 60 * 1000;
        // ceiling division on a signed value
        let days = diff_ms.div_euclid(day_ms) + i64::from(diff_ms.rem_euclid(day_ms) != 0);
        (0..=MAINTENANCE_DUE_SOON_DAYS).contains(&days)
    }
}

/// Instrument fields supplied on create and on full update
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct InstrumentInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Type is required"))]
    pub instrument_type: String,
    pub serial_number: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub status: InstrumentStatus,
    pub last_maintenance: DateTime<Utc>,
    pub next_maintenance: DateTime<Utc>,
}

/// Instrument as listed on the dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstrumentSummary {
    #[serde(flatten)]
    pub instrument: Instrument,
    pub maintenance_overdue: bool,
    pub maintenance_due_soon: bool,
}

impl InstrumentSummary {
    pub fn new(instrument: Instrument, now: DateTime<Utc>) -> Self {
        Self {
            maintenance_overdue: instrument.is_maintenance_overdue(now),
            maintenance_due_soon: instrument.is_maintenance_due_soon(now),
            instrument,
        }
    }
}
