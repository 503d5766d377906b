//! Sample inventory used when the store holds no collection yet

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::{
    Booking, Consumable, ConsumableUnit, Instrument, InstrumentStatus, MaintenanceLog,
};

fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn instrument(
    id: &str,
    name: &str,
    instrument_type: &str,
    serial_number: &str,
    location: &str,
    status: InstrumentStatus,
    last_maintenance: DateTime<Utc>,
    next_maintenance: DateTime<Utc>,
) -> Instrument {
    Instrument {
        id: id.to_string(),
        name: name.to_string(),
        instrument_type: instrument_type.to_string(),
        serial_number: serial_number.to_string(),
        location: location.to_string(),
        status,
        last_maintenance,
        next_maintenance,
    }
}

/// Default instruments; the sequencer is ten days overdue relative to `now`
pub fn instruments(now: DateTime<Utc>) -> Vec<Instrument> {
    vec![
        instrument(
            "instr-1",
            "Zeiss LSM 980",
            "Confocal Microscope",
            "SN-Z980-001",
            "Lab 301",
            InstrumentStatus::Available,
            date(2024, 5, 15),
            date(2024, 11, 15),
        ),
        instrument(
            "instr-2",
            "Thermo Orbitrap",
            "Mass Spectrometer",
            "SN-TFS-ORBI-015",
            "Lab 205",
            InstrumentStatus::InUse,
            date(2024, 3, 20),
            date(2024, 9, 20),
        ),
        instrument(
            "instr-3",
            "Agilent 1290 Infinity II",
            "HPLC System",
            "SN-AG-1290-2023",
            "Lab 110",
            InstrumentStatus::Maintenance,
            date(2024, 6, 1),
            date(2024, 12, 1),
        ),
        instrument(
            "instr-4",
            "Illumina NovaSeq 6000",
            "DNA Sequencer",
            "SN-IL-NS6K-007",
            "Genomics Core",
            InstrumentStatus::Offline,
            date(2024, 1, 10),
            now - Duration::days(10),
        ),
        instrument(
            "instr-5",
            "Bruker Avance NEO",
            "NMR Spectrometer",
            "SN-BRK-NEO-002",
            "NMR Facility",
            InstrumentStatus::Available,
            date(2024, 4, 5),
            date(2024, 10, 5),
        ),
    ]
}

pub fn bookings() -> Vec<Booking> {
    Vec::new()
}

pub fn logs() -> Vec<MaintenanceLog> {
    Vec::new()
}

pub fn consumables() -> Vec<Consumable> {
    let item = |id: &str, name: &str, unit, quantity, low_stock_threshold| Consumable {
        id: id.to_string(),
        name: name.to_string(),
        unit,
        quantity,
        low_stock_threshold,
    };
    vec![
        item("cons-1", "1000uL Pipette Tips", ConsumableUnit::Box, 5, 10),
        item("cons-2", "Ethanol (99%)", ConsumableUnit::Milliliters, 1500, 500),
        item("cons-3", "Nitrile Gloves (M)", ConsumableUnit::Box, 22, 5),
        item("cons-4", "SYBR Green Master Mix", ConsumableUnit::Items, 3, 2),
    ]
}
