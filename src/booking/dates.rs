//! Calendar date ranges for rentals.
//!
//! Dates travel as `YYYY-MM-DD` strings. A range covers the nights
//! `[from, from + nights)`; a same-day range still counts as one night.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::BookingError;

/// Storage format for booking dates
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest rental accepted in one booking
pub const MAX_RENTAL_NIGHTS: i64 = 365;

/// Inclusive calendar range picked by the renter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(skip)]
    until: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `to < from` and rentals longer than
    /// [`MAX_RENTAL_NIGHTS`] or ending past the last representable date.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, BookingError> {
        if to < from {
            return Err(BookingError::InvalidInput(format!(
                "end date {} is before start date {}",
                format_storage_date(to),
                format_storage_date(from)
            )));
        }

        let nights = (to - from).num_days().max(1);
        if nights > MAX_RENTAL_NIGHTS {
            return Err(BookingError::InvalidInput(format!(
                "rentals are limited to {} nights, got {}",
                MAX_RENTAL_NIGHTS, nights
            )));
        }

        let until = from
            .checked_add_days(Days::new(nights as u64))
            .ok_or_else(|| {
                BookingError::InvalidInput(format!(
                    "date range starting {} is out of bounds",
                    format_storage_date(from)
                ))
            })?;

        Ok(Self { from, to, until })
    }

    /// Parse a range from storage-formatted strings.
    pub fn parse(start_date: &str, end_date: &str) -> Result<Self, BookingError> {
        let from = parse_storage_date(start_date)?;
        let to = parse_storage_date(end_date)?;
        Self::new(from, to)
    }

    /// Number of billable nights (minimum 1)
    pub fn nights(&self) -> i64 {
        (self.until - self.from).num_days()
    }

    /// First date after the last billable night
    pub fn end_exclusive(&self) -> NaiveDate {
        self.until
    }

    /// Every billable night, in order
    pub fn night_dates(&self) -> impl Iterator<Item = NaiveDate> {
        let until = self.until;
        self.from.iter_days().take_while(move |night| *night < until)
    }

    /// Half-open overlap against an existing `[start, end)` window.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start < self.until && end > self.from
    }

    /// Whether `date` is one of the billable nights
    pub fn contains_night(&self, date: NaiveDate) -> bool {
        date >= self.from && date < self.until
    }

    pub fn start_string(&self) -> String {
        format_storage_date(self.from)
    }

    pub fn end_string(&self) -> String {
        format_storage_date(self.to)
    }

    /// Checkout date as stored on a booking; one past `from` for a same-day range
    pub fn end_exclusive_string(&self) -> String {
        format_storage_date(self.until)
    }
}

/// Parse a single storage-formatted date
pub fn parse_storage_date(value: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(value.trim(), STORAGE_DATE_FORMAT)
        .map_err(|_| BookingError::InvalidInput(format!("invalid date '{}', expected YYYY-MM-DD", value)))
}

pub fn format_storage_date(date: NaiveDate) -> String {
    date.format(STORAGE_DATE_FORMAT).to_string()
}
