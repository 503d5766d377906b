//! Calendar day-bucketing of bookings

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{Booking, Instrument};

/// Number of instrument colours the calendar cycles through
pub const PALETTE_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Month,
    #[default]
    Week,
    Day,
}

/// Query parameters of the calendar endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    pub view: Option<CalendarView>,
    /// Anchor date (YYYY-MM-DD), defaults to today
    pub date: Option<NaiveDate>,
    /// Viewer's offset from UTC in minutes, used to assign bookings to days
    pub tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarEntry {
    pub booking_id: String,
    pub instrument_id: String,
    /// None when the instrument no longer exists
    pub instrument_name: Option<String>,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub color_slot: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarPage {
    pub view: CalendarView,
    pub anchor: NaiveDate,
    pub title: String,
    /// Anchor of the previous page
    pub previous: NaiveDate,
    /// Anchor of the next page
    pub next: NaiveDate,
    /// Grid cells; month view starts with empty cells up to the first weekday
    pub cells: Vec<Option<CalendarDay>>,
}

/// Palette slot of an instrument: its position in the collection, 0 when absent
pub fn color_slot(instrument_id: &str, instruments: &[Instrument]) -> usize {
    instruments
        .iter()
        .position(|inst| inst.id == instrument_id)
        .unwrap_or(0)
        % PALETTE_SIZE
}

/// Anchor moved one page backwards (`step < 0`) or forwards
pub fn shift(view: CalendarView, anchor: NaiveDate, step: i32) -> NaiveDate {
    let moved = match view {
        CalendarView::Month => {
            let months = Months::new(step.unsigned_abs());
            if step >= 0 {
                anchor.checked_add_months(months)
            } else {
                anchor.checked_sub_months(months)
            }
        }
        CalendarView::Week => anchor.checked_add_signed(Duration::days(7 * i64::from(step))),
        CalendarView::Day => anchor.checked_add_signed(Duration::days(i64::from(step))),
    };
    moved.unwrap_or(anchor)
}

fn days_of(view: CalendarView, anchor: NaiveDate) -> (usize, Vec<NaiveDate>) {
    match view {
        CalendarView::Month => {
            let first = anchor.with_day(1).unwrap_or(anchor);
            let leading = first.weekday().num_days_from_sunday() as usize;
            let days = first
                .iter_days()
                .take_while(|d| d.month() == first.month())
                .collect();
            (leading, days)
        }
        CalendarView::Week => {
            let back = i64::from(anchor.weekday().num_days_from_sunday());
            let start = anchor
                .checked_sub_signed(Duration::days(back))
                .unwrap_or(NaiveDate::MIN);
            (0, start.iter_days().take(7).collect())
        }
        CalendarView::Day => (0, vec![anchor]),
    }
}

fn title(view: CalendarView, anchor: NaiveDate) -> String {
    match view {
        CalendarView::Month => anchor.format("%B %Y").to_string(),
        CalendarView::Week => format!("Week of {}", anchor.format("%b %-d")),
        CalendarView::Day => anchor.format("%A, %B %-d, %Y").to_string(),
    }
}

/// Bookings whose start falls on `day` in the viewer's offset, by start time
pub fn bookings_on(
    day: NaiveDate,
    bookings: &[Booking],
    instruments: &[Instrument],
    offset: FixedOffset,
) -> Vec<CalendarEntry> {
    let mut entries: Vec<CalendarEntry> = bookings
        .iter()
        .filter(|b| b.start_time.with_timezone(&offset).date_naive() == day)
        .map(|b| CalendarEntry {
            booking_id: b.id.clone(),
            instrument_id: b.instrument_id.clone(),
            instrument_name: instruments
                .iter()
                .find(|inst| inst.id == b.instrument_id)
                .map(|inst| inst.name.clone()),
            user_id: b.user_id.clone(),
            start_time: b.start_time,
            end_time: b.end_time,
            color_slot: color_slot(&b.instrument_id, instruments),
        })
        .collect();
    entries.sort_by_key(|e| e.start_time);
    entries
}

/// Build one calendar page around `anchor`
pub fn build_page(
    view: CalendarView,
    anchor: NaiveDate,
    bookings: &[Booking],
    instruments: &[Instrument],
    offset: FixedOffset,
) -> CalendarPage {
    let (leading, days) = days_of(view, anchor);
    let mut cells: Vec<Option<CalendarDay>> = Vec::with_capacity(leading + days.len());
    cells.extend(std::iter::repeat_with(|| None).take(leading));
    cells.extend(days.into_iter().map(|date| {
        Some(CalendarDay {
            date,
            entries: bookings_on(date, bookings, instruments, offset),
        })
    }));

    CalendarPage {
        view,
        anchor,
        title: title(view, anchor),
        previous: shift(view, anchor, -1),
        next: shift(view, anchor, 1),
        cells,
    }
}
