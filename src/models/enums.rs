//! Shared domain enums and their display attributes

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// InstrumentStatus
// ---------------------------------------------------------------------------

/// Operational status of an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum InstrumentStatus {
    Available,
    #[serde(rename = "In Use")]
    InUse,
    Maintenance,
    Offline,
}

/// How a status is drawn on the dashboard and in charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusStyle {
    pub label: &'static str,
    /// Chart colour (hex)
    pub chart_color: &'static str,
    /// Indicator dot class
    pub indicator_class: &'static str,
}

impl InstrumentStatus {
    pub const ALL: [InstrumentStatus; 4] = [
        InstrumentStatus::Available,
        InstrumentStatus::InUse,
        InstrumentStatus::Maintenance,
        InstrumentStatus::Offline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentStatus::Available => "Available",
            InstrumentStatus::InUse => "In Use",
            InstrumentStatus::Maintenance => "Maintenance",
            InstrumentStatus::Offline => "Offline",
        }
    }

    pub fn style(&self) -> StatusStyle {
        match self {
            InstrumentStatus::Available => StatusStyle {
                label: self.as_str(),
                chart_color: "#4ade80",
                indicator_class: "bg-green-500",
            },
            InstrumentStatus::InUse => StatusStyle {
                label: self.as_str(),
                chart_color: "#facc15",
                indicator_class: "bg-yellow-500",
            },
            InstrumentStatus::Maintenance => StatusStyle {
                label: self.as_str(),
                chart_color: "#f87171",
                indicator_class: "bg-red-500",
            },
            InstrumentStatus::Offline => StatusStyle {
                label: self.as_str(),
                chart_color: "#9ca3af",
                indicator_class: "bg-gray-500",
            },
        }
    }
}

impl std::fmt::Display for InstrumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InstrumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "available" => Ok(InstrumentStatus::Available),
            "in use" | "inuse" => Ok(InstrumentStatus::InUse),
            "maintenance" => Ok(InstrumentStatus::Maintenance),
            "offline" => Ok(InstrumentStatus::Offline),
            _ => Err(format!("Invalid instrument status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// Role carried by a user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    Admin,
    Technician,
    Researcher,
    Student,
}

impl UserRole {
    /// Role given to federated sign-ups that have no profile yet
    pub const FEDERATED_DEFAULT: UserRole = UserRole::Researcher;

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Technician => "Technician",
            UserRole::Researcher => "Researcher",
            UserRole::Student => "Student",
        }
    }

    /// Add, edit, delete and bulk-update instruments
    pub fn can_manage_instruments(&self) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::Technician | UserRole::Researcher | UserRole::Student => false,
        }
    }

    /// Analytics and reports pages
    pub fn can_view_admin_pages(&self) -> bool {
        match self {
            UserRole::Admin | UserRole::Technician => true,
            UserRole::Researcher | UserRole::Student => false,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConsumableUnit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ConsumableUnit {
    #[serde(rename = "items")]
    Items,
    #[serde(rename = "mL")]
    Milliliters,
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "box")]
    Box,
}

impl std::fmt::Display for ConsumableUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConsumableUnit::Items => "items",
            ConsumableUnit::Milliliters => "mL",
            ConsumableUnit::Grams => "g",
            ConsumableUnit::Box => "box",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}
