//! Instrument filter/sort pipeline

use std::cmp::Ordering;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    models::{Instrument, InstrumentStatus},
};

/// Value of the status/location dropdowns meaning "no filter"
pub const ALL: &str = "All";

/// Sort order of the instrument list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    NextMaintenanceAsc,
    NextMaintenanceDesc,
    NameAsc,
    NameDesc,
}

/// Query parameters of the instrument list
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct InstrumentQuery {
    /// Case-insensitive match against name, type and location
    pub search: Option<String>,
    /// "All" or a status label
    pub status: Option<String>,
    /// "All" or an exact location
    pub location: Option<String>,
    pub sort: Option<SortKey>,
    /// Comma-separated ids currently selected in the list
    pub selected: Option<String>,
}

/// Parsed filter state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentFilter {
    pub search: String,
    pub status: Option<InstrumentStatus>,
    pub location: Option<String>,
    pub sort: SortKey,
}

impl TryFrom<InstrumentQuery> for InstrumentFilter {
    type Error = AppError;

    fn try_from(query: InstrumentQuery) -> Result<Self, Self::Error> {
        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") | Some(ALL) => None,
            Some(s) => Some(s.parse::<InstrumentStatus>().map_err(AppError::Validation)?),
        };
        let location = query
            .location
            .filter(|l| !l.is_empty() && l != ALL);

        Ok(Self {
            search: query.search.unwrap_or_default(),
            status,
            location,
            sort: query.sort.unwrap_or_default(),
        })
    }
}

impl InstrumentFilter {
    pub fn matches(&self, instrument: &Instrument) -> bool {
        let term = self.search.to_lowercase();
        let text_match = term.is_empty()
            || [&instrument.name, &instrument.instrument_type, &instrument.location]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));

        text_match
            && self.status.map_or(true, |s| instrument.status == s)
            && self
                .location
                .as_deref()
                .map_or(true, |l| instrument.location == l)
    }

    fn compare(&self, a: &Instrument, b: &Instrument) -> Ordering {
        match self.sort {
            SortKey::NextMaintenanceAsc => a.next_maintenance.cmp(&b.next_maintenance),
            SortKey::NextMaintenanceDesc => b.next_maintenance.cmp(&a.next_maintenance),
            SortKey::NameAsc => compare_names(&a.name, &b.name),
            SortKey::NameDesc => compare_names(&b.name, &a.name),
        }
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Derived, ordered view of the instruments. The input is left untouched.
pub fn filter_and_sort(instruments: &[Instrument], filter: &InstrumentFilter) -> Vec<Instrument> {
    let mut view: Vec<Instrument> = instruments
        .iter()
        .filter(|inst| filter.matches(inst))
        .cloned()
        .collect();
    view.sort_by(|a, b| filter.compare(a, b));
    view
}

/// Distinct locations in first-seen order
pub fn unique_locations(instruments: &[Instrument]) -> Vec<String> {
    instruments
        .iter()
        .map(|inst| inst.location.clone())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
