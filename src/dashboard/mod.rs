//! Derived dashboard views: filtering, selection and the booking calendar

pub mod calendar;
pub mod filter;
pub mod selection;

pub use filter::{filter_and_sort, unique_locations, InstrumentFilter, InstrumentQuery, SortKey};
pub use selection::{Selection, SelectionAction, SelectionState};
