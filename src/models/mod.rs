//! Data models for LabMonitor

pub mod booking;
pub mod consumable;
pub mod enums;
pub mod instrument;
pub mod maintenance;
pub mod seed;
pub mod user;

// Re-export commonly used types
pub use booking::Booking;
pub use consumable::Consumable;
pub use enums::{ConsumableUnit, InstrumentStatus, Theme, UserRole};
pub use instrument::Instrument;
pub use maintenance::MaintenanceLog;
pub use user::User;
