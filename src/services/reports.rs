//! CSV exports of bookings and maintenance logs

use std::borrow::Cow;

use crate::models::{Booking, Instrument, MaintenanceLog};

pub const USAGE_HEADER: &str = "Instrument Name,User,Start Time,End Time,Duration (Hours),Purpose";
pub const MAINTENANCE_HEADER: &str = "Instrument Name,Date,Technician,Description,Cost";

/// Placeholder for a record whose instrument no longer exists
pub const MISSING_INSTRUMENT: &str = "N/A";

const LINE_END: &str = "\r\n";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Always quoted, embedded quotes doubled
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Quoted only when the value would otherwise break the row
fn field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(quoted(value))
    } else {
        Cow::Borrowed(value)
    }
}

fn instrument_name<'a>(instruments: &'a [Instrument], id: &str) -> &'a str {
    instruments
        .iter()
        .find(|inst| inst.id == id)
        .map(|inst| inst.name.as_str())
        .unwrap_or(MISSING_INSTRUMENT)
}

/// One row per booking, most recent start first
pub fn usage_report(instruments: &[Instrument], bookings: &[Booking]) -> String {
    let mut sorted: Vec<&Booking> = bookings.iter().collect();
    sorted.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    let mut csv = String::from(USAGE_HEADER);
    csv.push_str(LINE_END);
    for booking in sorted {
        let row = [
            field(instrument_name(instruments, &booking.instrument_id)).into_owned(),
            field(&booking.user_id).into_owned(),
            booking.start_time.format(TIMESTAMP_FORMAT).to_string(),
            booking.end_time.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.2}", booking.duration_hours()),
            quoted(&booking.purpose),
        ];
        csv.push_str(&row.join(","));
        csv.push_str(LINE_END);
    }
    csv
}

/// One row per maintenance log, most recent first
pub fn maintenance_report(instruments: &[Instrument], logs: &[MaintenanceLog]) -> String {
    let mut sorted: Vec<&MaintenanceLog> = logs.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut csv = String::from(MAINTENANCE_HEADER);
    csv.push_str(LINE_END);
    for log in sorted {
        let row = [
            field(instrument_name(instruments, &log.instrument_id)).into_owned(),
            log.date.format(DATE_FORMAT).to_string(),
            field(&log.technician).into_owned(),
            quoted(&log.description),
            log.cost.to_string(),
        ];
        csv.push_str(&row.join(","));
        csv.push_str(LINE_END);
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstrumentStatus;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn microscope() -> Instrument {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Instrument {
            id: "instr-1".to_string(),
            name: "Zeiss LSM 980".to_string(),
            instrument_type: "Confocal Microscope".to_string(),
            serial_number: "SN-1".to_string(),
            location: "Lab 301".to_string(),
            status: InstrumentStatus::Available,
            last_maintenance: at,
            next_maintenance: at,
        }
    }

    fn booking(id: &str, instrument_id: &str, day: u32, purpose: &str) -> Booking {
        Booking {
            id: id.to_string(),
            instrument_id: instrument_id.to_string(),
            user_id: "Ada Lovelace".to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 5, day, 11, 20, 0).unwrap(),
            purpose: purpose.to_string(),
        }
    }

    #[test]
    fn test_empty_usage_report_is_header_only() {
        assert_eq!(usage_report(&[], &[]), format!("{}\r\n", USAGE_HEADER));
    }

    #[test]
    fn test_usage_rows_newest_first() {
        let csv = usage_report(
            &[microscope()],
            &[booking("b1", "instr-1", 1, "Imaging"), booking("b2", "gone", 3, "Say \"hi\"")],
        );
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "N/A,Ada Lovelace,2024-05-03 09:00,2024-05-03 11:20,2.33,\"Say \"\"hi\"\"\"");
        assert_eq!(lines[2], "Zeiss LSM 980,Ada Lovelace,2024-05-01 09:00,2024-05-01 11:20,2.33,\"Imaging\"");
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_maintenance_report() {
        let log = MaintenanceLog {
            id: "log-1".to_string(),
            instrument_id: "instr-1".to_string(),
            date: Utc.with_ymd_and_hms(2024, 6, 2, 15, 0, 0).unwrap(),
            technician: "Smith, J.".to_string(),
            description: "Laser alignment".to_string(),
            cost: Decimal::new(25050, 2),
        };
        let csv = maintenance_report(&[microscope()], &[log]);
        assert_eq!(
            csv,
            format!(
                "{}\r\nZeiss LSM 980,2024-06-02,\"Smith, J.\",\"Laser alignment\",250.50\r\n",
                MAINTENANCE_HEADER
            )
        );
    }
}
