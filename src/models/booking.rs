//! Booking model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A reserved usage window for an instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: String,
    /// Referenced instrument; may dangle after the instrument is deleted
    pub instrument_id: String,
    /// Display name of the user who booked
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub purpose: String,
}

impl Booking {
    /// Booked hours; negative when the end precedes the start
    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 3_600_000.0
    }
}

/// Create booking request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBooking {
    #[validate(length(min = 1, message = "Instrument is required"))]
    pub instrument_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub purpose: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duration_hours() {
        let booking = Booking {
            id: "book-1".to_string(),
            instrument_id: "instr-1".to_string(),
            user_id: "Ada".to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap(),
            purpose: String::new(),
        };
        assert_eq!(booking.duration_hours(), 1.5);

        let reversed = Booking {
            start_time: booking.end_time,
            end_time: booking.start_time,
            ..booking
        };
        assert_eq!(reversed.duration_hours(), -1.5);
    }
}
