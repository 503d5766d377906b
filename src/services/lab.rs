//! Lab inventory service: owns the collections and applies every mutation
//!
//! A mutation computes the new collection, saves it, and only then replaces
//! the in-memory copy, so a failed save leaves the state untouched.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    alerts::{self, Alert, NotifiedSet},
    analytics::{self, Analytics},
    email::AlertChannel,
    reports,
};
use crate::{
    dashboard::{
        calendar::{self, CalendarPage, CalendarView},
        filter_and_sort, unique_locations, InstrumentFilter, Selection, SelectionAction,
        SelectionState,
    },
    error::{AppError, AppResult},
    models::{
        booking::CreateBooking,
        consumable::ConsumableSummary,
        instrument::{InstrumentInput, InstrumentSummary},
        maintenance::CreateMaintenanceLog,
        seed, Booking, Consumable, Instrument, InstrumentStatus, MaintenanceLog, Theme,
    },
    repository::{keys, Repository},
};

/// Filtered instrument list plus the location dropdown values
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstrumentListing {
    pub instruments: Vec<InstrumentSummary>,
    pub total: usize,
    /// Distinct locations of the whole inventory
    pub locations: Vec<String>,
    /// Caller's selection read against this view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionState>,
}

/// Instrument with its booking and maintenance history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstrumentDetail {
    #[serde(flatten)]
    pub instrument: InstrumentSummary,
    pub bookings: Vec<Booking>,
    pub logs: Vec<MaintenanceLog>,
}

/// Outcome of a booking request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingCreated {
    pub booking: Booking,
    /// Status of the instrument after the booking
    pub instrument_status: InstrumentStatus,
}

struct LabState {
    instruments: Vec<Instrument>,
    bookings: Vec<Booking>,
    logs: Vec<MaintenanceLog>,
    consumables: Vec<Consumable>,
    notified: NotifiedSet,
    theme: Theme,
}

fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

fn not_found_instrument(id: &str) -> AppError {
    AppError::InstrumentNotFound(id.to_string())
}

#[derive(Clone)]
pub struct LabService {
    repository: Repository,
    state: Arc<Mutex<LabState>>,
    channel: Arc<dyn AlertChannel>,
    admin_email: String,
}

impl LabService {
    /// Load every collection (seeding absent ones) and run the alert rules once
    pub async fn load(
        repository: Repository,
        channel: Arc<dyn AlertChannel>,
        admin_email: String,
        now: DateTime<Utc>,
    ) -> Self {
        let instruments = repository.load(keys::INSTRUMENTS, seed::instruments(now)).await;
        let bookings = repository.load(keys::BOOKINGS, seed::bookings()).await;
        let logs = repository.load(keys::LOGS, seed::logs()).await;
        let consumables = repository.load(keys::CONSUMABLES, seed::consumables()).await;
        let theme = repository.load(keys::THEME, Theme::default()).await;

        let mut notified = NotifiedSet::new();
        let fired = alerts::check_all(&instruments, &bookings, &consumables, &mut notified, now);

        tracing::info!(
            instruments = instruments.len(),
            bookings = bookings.len(),
            logs = logs.len(),
            consumables = consumables.len(),
            alerts = fired.len(),
            "Lab inventory loaded"
        );

        let service = Self {
            repository,
            state: Arc::new(Mutex::new(LabState {
                instruments,
                bookings,
                logs,
                consumables,
                notified,
                theme,
            })),
            channel,
            admin_email,
        };
        service.dispatch(fired).await;
        service
    }

    /// Hand alerts to the channel; delivery failures are logged only
    async fn dispatch(&self, fired: Vec<Alert>) {
        for alert in fired {
            let key = alert.key();
            match self
                .channel
                .send(&self.admin_email, &alert.subject(), &alert.body())
                .await
            {
                Ok(()) => tracing::info!(alert = %key, "Alert sent"),
                Err(e) => tracing::warn!(alert = %key, "Alert delivery failed: {}", e),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Instruments
    // -----------------------------------------------------------------------

    pub async fn list_instruments(
        &self,
        filter: &InstrumentFilter,
        selection: Option<Selection>,
    ) -> InstrumentListing {
        let state = self.state.lock().await;
        let now = Utc::now();
        let view = filter_and_sort(&state.instruments, filter);
        InstrumentListing {
            total: view.len(),
            selection: selection.map(|selection| selection.state_in(&view)),
            instruments: view
                .into_iter()
                .map(|inst| InstrumentSummary::new(inst, now))
                .collect(),
            locations: unique_locations(&state.instruments),
        }
    }

    /// Apply a checkbox action against the filtered view; the result is pruned to that view
    pub async fn update_selection(
        &self,
        mut selection: Selection,
        action: SelectionAction,
        id: Option<&str>,
        filter: &InstrumentFilter,
    ) -> AppResult<SelectionState> {
        let state = self.state.lock().await;
        let view = filter_and_sort(&state.instruments, filter);
        selection.apply(action, id, &view)?;
        Ok(selection.state_in(&view))
    }

    pub async fn find_instrument(&self, id: &str) -> Option<Instrument> {
        let state = self.state.lock().await;
        state.instruments.iter().find(|inst| inst.id == id).cloned()
    }

    pub async fn get_instrument(&self, id: &str) -> AppResult<InstrumentDetail> {
        let state = self.state.lock().await;
        let instrument = state
            .instruments
            .iter()
            .find(|inst| inst.id == id)
            .cloned()
            .ok_or_else(|| not_found_instrument(id))?;

        Ok(InstrumentDetail {
            instrument: InstrumentSummary::new(instrument, Utc::now()),
            bookings: state
                .bookings
                .iter()
                .filter(|b| b.instrument_id == id)
                .cloned()
                .collect(),
            logs: state
                .logs
                .iter()
                .filter(|log| log.instrument_id == id)
                .cloned()
                .collect(),
        })
    }

    pub async fn add_instrument(&self, input: InstrumentInput) -> AppResult<Instrument> {
        let mut state = self.state.lock().await;
        let instrument = Instrument::from_input(new_id("instr"), input);

        let mut instruments = state.instruments.clone();
        instruments.push(instrument.clone());
        self.repository.save(keys::INSTRUMENTS, &instruments).await?;
        state.instruments = instruments;

        tracing::info!(id = %instrument.id, name = %instrument.name, "Instrument added");
        Ok(instrument)
    }

    pub async fn update_instrument(&self, id: &str, input: InstrumentInput) -> AppResult<Instrument> {
        let mut state = self.state.lock().await;
        let position = state
            .instruments
            .iter()
            .position(|inst| inst.id == id)
            .ok_or_else(|| not_found_instrument(id))?;

        let updated = Instrument::from_input(id.to_string(), input);
        let mut instruments = state.instruments.clone();
        instruments[position] = updated.clone();
        self.repository.save(keys::INSTRUMENTS, &instruments).await?;
        state.instruments = instruments;

        tracing::info!(id, "Instrument updated");
        Ok(updated)
    }

    /// Remove an instrument; its bookings and logs are left in place
    pub async fn delete_instrument(&self, id: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.instruments.iter().any(|inst| inst.id == id) {
            return Err(not_found_instrument(id));
        }

        let instruments: Vec<Instrument> = state
            .instruments
            .iter()
            .filter(|inst| inst.id != id)
            .cloned()
            .collect();
        self.repository.save(keys::INSTRUMENTS, &instruments).await?;
        state.instruments = instruments;

        tracing::info!(id, "Instrument deleted");
        Ok(())
    }

    /// Overwrite the status of every selected instrument.
    ///
    /// With a `view` filter the selection is first pruned to the instruments
    /// visible in that view. Unknown ids are ignored. Returns the updated ids.
    pub async fn bulk_update_status(
        &self,
        mut selection: Selection,
        status: InstrumentStatus,
        view: Option<&InstrumentFilter>,
    ) -> AppResult<Vec<String>> {
        let mut state = self.state.lock().await;
        if let Some(filter) = view {
            selection.retain_visible(&filter_and_sort(&state.instruments, filter));
        }

        let mut updated = Vec::new();
        let instruments: Vec<Instrument> = state
            .instruments
            .iter()
            .map(|inst| {
                if selection.contains(&inst.id) {
                    updated.push(inst.id.clone());
                    Instrument {
                        status,
                        ..inst.clone()
                    }
                } else {
                    inst.clone()
                }
            })
            .collect();

        if updated.is_empty() {
            return Ok(updated);
        }
        self.repository.save(keys::INSTRUMENTS, &instruments).await?;
        state.instruments = instruments;

        tracing::info!(count = updated.len(), %status, "Bulk status update");
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Bookings and maintenance
    // -----------------------------------------------------------------------

    pub async fn list_bookings(&self) -> Vec<Booking> {
        self.state.lock().await.bookings.clone()
    }

    /// Record a booking; an Available instrument becomes In Use, any other
    /// status is left as is and the booking is still recorded
    pub async fn add_booking(&self, user_name: &str, request: CreateBooking) -> AppResult<BookingCreated> {
        let mut state = self.state.lock().await;
        let position = state
            .instruments
            .iter()
            .position(|inst| inst.id == request.instrument_id)
            .ok_or_else(|| not_found_instrument(&request.instrument_id))?;

        let booking = Booking {
            id: new_id("book"),
            instrument_id: request.instrument_id,
            user_id: user_name.to_string(),
            start_time: request.start_time,
            end_time: request.end_time,
            purpose: request.purpose,
        };

        let mut bookings = state.bookings.clone();
        bookings.push(booking.clone());

        let current = state.instruments[position].status;
        let transition = current == InstrumentStatus::Available;
        let instruments = transition.then(|| {
            let mut instruments = state.instruments.clone();
            instruments[position].status = InstrumentStatus::InUse;
            instruments
        });

        if let Some(instruments) = &instruments {
            self.repository.save(keys::INSTRUMENTS, instruments).await?;
        }
        if let Err(e) = self.repository.save(keys::BOOKINGS, &bookings).await {
            if instruments.is_some() {
                if let Err(restore) = self.repository.save(keys::INSTRUMENTS, &state.instruments).await {
                    tracing::error!("Failed to restore instruments after booking save error: {}", restore);
                }
            }
            return Err(e);
        }

        state.bookings = bookings;
        if let Some(instruments) = instruments {
            state.instruments = instruments;
        }

        let instrument_status = state.instruments[position].status;
        if transition {
            tracing::info!(booking = %booking.id, instrument = %booking.instrument_id, "Booking created, instrument now in use");
        } else {
            tracing::info!(
                booking = %booking.id,
                instrument = %booking.instrument_id,
                status = %instrument_status,
                "Booking created on unavailable instrument, status unchanged"
            );
        }

        Ok(BookingCreated {
            booking,
            instrument_status,
        })
    }

    pub async fn list_logs(&self) -> Vec<MaintenanceLog> {
        self.state.lock().await.logs.clone()
    }

    /// Append a maintenance log; instrument status and dates are not touched
    pub async fn add_log(&self, request: CreateMaintenanceLog) -> AppResult<MaintenanceLog> {
        let mut state = self.state.lock().await;
        if !state.instruments.iter().any(|inst| inst.id == request.instrument_id) {
            return Err(not_found_instrument(&request.instrument_id));
        }

        let log = MaintenanceLog {
            id: new_id("log"),
            instrument_id: request.instrument_id,
            date: request.date,
            technician: request.technician,
            description: request.description,
            cost: request.cost,
        };

        let mut logs = state.logs.clone();
        logs.push(log.clone());
        self.repository.save(keys::LOGS, &logs).await?;
        state.logs = logs;

        tracing::info!(log = %log.id, instrument = %log.instrument_id, "Maintenance logged");
        Ok(log)
    }

    // -----------------------------------------------------------------------
    // Consumables
    // -----------------------------------------------------------------------

    pub async fn list_consumables(&self) -> Vec<ConsumableSummary> {
        let state = self.state.lock().await;
        state
            .consumables
            .iter()
            .cloned()
            .map(ConsumableSummary::from)
            .collect()
    }

    /// Apply `delta` (clamped at zero), then re-run the low-stock rule for it
    pub async fn adjust_consumable(&self, id: &str, delta: i64) -> AppResult<ConsumableSummary> {
        let (consumable, fired) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let position = state
                .consumables
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Consumable with ID \"{}\" not found.", id)))?;

            let mut consumables = state.consumables.clone();
            consumables[position].quantity = consumables[position].adjusted_quantity(delta);
            self.repository.save(keys::CONSUMABLES, &consumables).await?;
            state.consumables = consumables;

            let consumable = state.consumables[position].clone();
            tracing::debug!(id, quantity = consumable.quantity, "Stock adjusted");
            let fired = alerts::check_low_stock(&consumable, &mut state.notified);
            (consumable, fired)
        };

        self.dispatch(fired.into_iter().collect()).await;
        Ok(consumable.into())
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    pub async fn calendar(&self, view: CalendarView, anchor: NaiveDate, offset: FixedOffset) -> CalendarPage {
        let state = self.state.lock().await;
        calendar::build_page(view, anchor, &state.bookings, &state.instruments, offset)
    }

    pub async fn analytics(&self) -> Analytics {
        let state = self.state.lock().await;
        analytics::compute(&state.instruments, &state.bookings, &state.logs)
    }

    pub async fn usage_report(&self) -> String {
        let state = self.state.lock().await;
        reports::usage_report(&state.instruments, &state.bookings)
    }

    pub async fn maintenance_report(&self) -> String {
        let state = self.state.lock().await;
        reports::maintenance_report(&state.instruments, &state.logs)
    }

    /// Keys of the conditions already alerted on
    pub async fn notified_keys(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.notified.keys().map(str::to_string).collect()
    }

    // -----------------------------------------------------------------------
    // Theme
    // -----------------------------------------------------------------------

    pub async fn theme(&self) -> Theme {
        self.state.lock().await.theme
    }

    pub async fn set_theme(&self, theme: Theme) -> AppResult<Theme> {
        let mut state = self.state.lock().await;
        self.repository.save(keys::THEME, &theme).await?;
        state.theme = theme;
        Ok(theme)
    }

    pub async fn toggle_theme(&self) -> AppResult<Theme> {
        let mut state = self.state.lock().await;
        let theme = state.theme.toggled();
        self.repository.save(keys::THEME, &theme).await?;
        state.theme = theme;
        Ok(theme)
    }
}
