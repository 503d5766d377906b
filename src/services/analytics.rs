//! Usage and cost rollups for the analytics charts

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Booking, Instrument, InstrumentStatus, MaintenanceLog};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InstrumentUsage {
    pub instrument_id: String,
    pub name: String,
    /// Sum of booked hours; not validated, so it can be negative
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: InstrumentStatus,
    pub color: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct InstrumentCost {
    pub instrument_id: String,
    pub name: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Analytics {
    pub usage: Vec<InstrumentUsage>,
    pub status_distribution: Vec<StatusCount>,
    pub maintenance_cost: Vec<InstrumentCost>,
}

/// Booked hours per instrument, in collection order
pub fn usage_hours(instruments: &[Instrument], bookings: &[Booking]) -> Vec<InstrumentUsage> {
    instruments
        .iter()
        .map(|inst| InstrumentUsage {
            instrument_id: inst.id.clone(),
            name: inst.name.clone(),
            hours: bookings
                .iter()
                .filter(|b| b.instrument_id == inst.id)
                .map(Booking::duration_hours)
                .sum(),
        })
        .collect()
}

/// Instrument count per status; only statuses present, first seen first
pub fn status_distribution(instruments: &[Instrument]) -> Vec<StatusCount> {
    let mut counts: IndexMap<InstrumentStatus, usize> = IndexMap::new();
    for inst in instruments {
        *counts.entry(inst.status).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(status, count)| StatusCount {
            status,
            color: status.style().chart_color.to_string(),
            count,
        })
        .collect()
}

/// Total maintenance cost per instrument, in collection order
pub fn maintenance_cost(instruments: &[Instrument], logs: &[MaintenanceLog]) -> Vec<InstrumentCost> {
    instruments
        .iter()
        .map(|inst| InstrumentCost {
            instrument_id: inst.id.clone(),
            name: inst.name.clone(),
            total: logs
                .iter()
                .filter(|log| log.instrument_id == inst.id)
                .map(|log| log.cost)
                .sum(),
        })
        .collect()
}

pub fn compute(instruments: &[Instrument], bookings: &[Booking], logs: &[MaintenanceLog]) -> Analytics {
    Analytics {
        usage: usage_hours(instruments, bookings),
        status_distribution: status_distribution(instruments),
        maintenance_cost: maintenance_cost(instruments, logs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn instrument(id: &str, status: InstrumentStatus) -> Instrument {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Instrument {
            id: id.to_string(),
            name: id.to_uppercase(),
            instrument_type: "HPLC".to_string(),
            serial_number: id.to_string(),
            location: "Lab".to_string(),
            status,
            last_maintenance: at,
            next_maintenance: at,
        }
    }

    fn booking(instrument_id: &str, hours: i64) -> Booking {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        Booking {
            id: format!("book-{}-{}", instrument_id, hours),
            instrument_id: instrument_id.to_string(),
            user_id: "Ada".to_string(),
            start_time: start,
            end_time: start + Duration::hours(hours),
            purpose: String::new(),
        }
    }

    #[test]
    fn test_usage_includes_idle_and_negative() {
        let instruments = vec![instrument("a", InstrumentStatus::Available), instrument("b", InstrumentStatus::InUse)];
        let usage = usage_hours(&instruments, &[booking("a", 2), booking("a", -3), booking("gone", 5)]);
        assert_eq!(usage[0].hours, -1.0);
        assert_eq!(usage[1].hours, 0.0);
    }

    #[test]
    fn test_status_distribution_first_seen_order() {
        let instruments = vec![
            instrument("a", InstrumentStatus::Offline),
            instrument("b", InstrumentStatus::Available),
            instrument("c", InstrumentStatus::Offline),
        ];
        let dist = status_distribution(&instruments);
        assert_eq!(dist.len(), 2);
        assert_eq!((dist[0].status, dist[0].count), (InstrumentStatus::Offline, 2));
        assert_eq!((dist[1].status, dist[1].count), (InstrumentStatus::Available, 1));
    }

    #[test]
    fn test_maintenance_cost_sums_per_instrument() {
        let log = |instrument_id: &str, cents: i64| MaintenanceLog {
            id: format!("log-{}", cents),
            instrument_id: instrument_id.to_string(),
            date: Utc::now(),
            technician: "Tech".to_string(),
            description: String::new(),
            cost: Decimal::new(cents, 2),
        };
        let instruments = vec![instrument("a", InstrumentStatus::Available)];
        let costs = maintenance_cost(&instruments, &[log("a", 1050), log("a", 250), log("b", 999)]);
        assert_eq!(costs[0].total, Decimal::new(1300, 2));
    }
}
