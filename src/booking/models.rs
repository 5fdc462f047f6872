//! Database models for booking queries.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Booking statuses that hold the equipment
pub const BLOCKING_STATUSES: [&str; 2] = ["approved", "active"];

/// Equipment listing from `equipment`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Equipment {
    pub id: Uuid,
    pub title: String,
    pub daily_rate: Decimal,
    pub damage_deposit: Decimal,
    pub currency: String,
    pub is_active: bool,
}

/// Date window of an existing booking from `bookings`
#[derive(Debug, Clone, FromRow)]
pub struct ReservationWindow {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
}

impl ReservationWindow {
    pub fn is_blocking(&self) -> bool {
        BLOCKING_STATUSES.contains(&self.status.as_str())
    }
}

/// Owner calendar entry from `availability_calendar`
#[derive(Debug, Clone, FromRow)]
pub struct AvailabilityOverride {
    pub date: NaiveDate,
    pub is_available: bool,
    pub custom_rate: Option<Decimal>,
}
