//! Alert rules with de-duplication
//!
//! Each rule decides whether a condition should fire and records the fired
//! key in a [`NotifiedSet`] owned by the caller. Overdue maintenance and
//! overdue check-in keys are never cleared. Low-stock keys are removed once
//! the quantity rises above the threshold, so a later drop alerts again.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;

use crate::models::{Booking, Consumable, ConsumableUnit, Instrument, InstrumentStatus};

/// Keys of conditions that already produced an alert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifiedSet {
    keys: IndexSet<String>,
}

impl NotifiedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Record `key`; false when it was already present
    fn insert(&mut self, key: String) -> bool {
        self.keys.insert(key)
    }

    fn remove(&mut self, key: &str) -> bool {
        self.keys.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

/// A condition worth telling the lab admin about
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    OverdueMaintenance {
        instrument_id: String,
        name: String,
        serial_number: String,
        location: String,
        due: DateTime<Utc>,
    },
    OverdueCheckIn {
        booking_id: String,
        instrument_name: String,
        serial_number: String,
        user: String,
        end_time: DateTime<Utc>,
    },
    LowStock {
        consumable_id: String,
        name: String,
        quantity: u32,
        threshold: u32,
        unit: ConsumableUnit,
    },
}

pub fn overdue_maintenance_key(instrument_id: &str) -> String {
    format!("overdue-maintenance-{}", instrument_id)
}

pub fn overdue_checkin_key(booking_id: &str) -> String {
    format!("overdue-checkin-{}", booking_id)
}

pub fn low_stock_key(consumable_id: &str) -> String {
    format!("low-stock-{}", consumable_id)
}

impl Alert {
    /// De-duplication key of this alert
    pub fn key(&self) -> String {
        match self {
            Alert::OverdueMaintenance { instrument_id, .. } => overdue_maintenance_key(instrument_id),
            Alert::OverdueCheckIn { booking_id, .. } => overdue_checkin_key(booking_id),
            Alert::LowStock { consumable_id, .. } => low_stock_key(consumable_id),
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Alert::OverdueMaintenance { name, .. } => {
                format!("Urgent: Maintenance Overdue for {}", name)
            }
            Alert::OverdueCheckIn { instrument_name, .. } => {
                format!("Overdue check-in for {}", instrument_name)
            }
            Alert::LowStock { name, .. } => format!("Low Stock Alert: {}", name),
        }
    }

    pub fn body(&self) -> String {
        match self {
            Alert::OverdueMaintenance {
                name,
                serial_number,
                location,
                due,
                ..
            } => format!(
                r#"Dear Lab Admin,

This is an automated alert to inform you that the following instrument is overdue for its scheduled maintenance:

  - Instrument: {name} ({serial_number})
  - Location: {location}
  - Maintenance Due Date: {due}

Please schedule the required service as soon as possible to ensure equipment reliability and safety.

Thank you,
LabMonitor System
"#,
                due = due.format("%Y-%m-%d"),
            ),
            Alert::OverdueCheckIn {
                instrument_name,
                serial_number,
                user,
                end_time,
                ..
            } => format!(
                r#"Dear Lab Admin,

This is an alert that an instrument has not been checked in after its booking period ended:

  - Instrument: {instrument_name} ({serial_number})
  - User: {user}
  - Booking End Time: {end}

Please verify the instrument's status and ensure it is available for the next user.

Thank you,
LabMonitor System
"#,
                end = end_time.format("%Y-%m-%d %H:%M UTC"),
            ),
            Alert::LowStock {
                name,
                quantity,
                threshold,
                unit,
                ..
            } => format!(
                r#"Dear Lab Admin,

This is an automated alert that a consumable item is running low on stock:

  - Item: {name}
  - Current Quantity: {quantity} {unit}
  - Low Stock Threshold: {threshold} {unit}

Please reorder this item soon to avoid a shortage.

Thank you,
LabMonitor System
"#
            ),
        }
    }
}

/// Instruments whose next maintenance is in the past, regardless of status
pub fn check_overdue_maintenance(
    instruments: &[Instrument],
    notified: &mut NotifiedSet,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    instruments
        .iter()
        .filter(|inst| inst.is_maintenance_overdue(now))
        .filter(|inst| notified.insert(overdue_maintenance_key(&inst.id)))
        .map(|inst| Alert::OverdueMaintenance {
            instrument_id: inst.id.clone(),
            name: inst.name.clone(),
            serial_number: inst.serial_number.clone(),
            location: inst.location.clone(),
            due: inst.next_maintenance,
        })
        .collect()
}

/// Bookings that ended while their instrument is still in use
pub fn check_overdue_bookings(
    bookings: &[Booking],
    instruments: &[Instrument],
    notified: &mut NotifiedSet,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for booking in bookings.iter().filter(|b| b.end_time < now) {
        let Some(instrument) = instruments
            .iter()
            .find(|inst| inst.id == booking.instrument_id && inst.status == InstrumentStatus::InUse)
        else {
            continue;
        };
        if notified.insert(overdue_checkin_key(&booking.id)) {
            alerts.push(Alert::OverdueCheckIn {
                booking_id: booking.id.clone(),
                instrument_name: instrument.name.clone(),
                serial_number: instrument.serial_number.clone(),
                user: booking.user_id.clone(),
                end_time: booking.end_time,
            });
        }
    }
    alerts
}

/// Low-stock rule for a single consumable; re-arms once stock recovers
pub fn check_low_stock(consumable: &Consumable, notified: &mut NotifiedSet) -> Option<Alert> {
    let key = low_stock_key(&consumable.id);
    if !consumable.is_low_stock() {
        if notified.remove(&key) {
            tracing::debug!(consumable = %consumable.id, "Stock recovered, low-stock alert re-armed");
        }
        return None;
    }

    notified.insert(key).then(|| Alert::LowStock {
        consumable_id: consumable.id.clone(),
        name: consumable.name.clone(),
        quantity: consumable.quantity,
        threshold: consumable.low_stock_threshold,
        unit: consumable.unit,
    })
}

/// Every rule, as run when the collections are first loaded
pub fn check_all(
    instruments: &[Instrument],
    bookings: &[Booking],
    consumables: &[Consumable],
    notified: &mut NotifiedSet,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts = check_overdue_maintenance(instruments, notified, now);
    alerts.extend(check_overdue_bookings(bookings, instruments, notified, now));
    alerts.extend(
        consumables
            .iter()
            .filter_map(|c| check_low_stock(c, notified)),
    );
    alerts
}
