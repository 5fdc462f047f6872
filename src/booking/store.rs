//! Read access to equipment, bookings and the owner calendar.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{AvailabilityOverride, Equipment, ReservationWindow};
use super::queries;

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_equipment(&self, equipment_id: Uuid) -> Result<Option<Equipment>, AppError>;

    /// Holding bookings (approved or active) intersecting `[from, until)`
    async fn find_reservations_overlapping(
        &self,
        equipment_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<ReservationWindow>, AppError>;

    /// Calendar overrides (blocked nights, custom rates) in `[from, until)`
    async fn find_availability_overrides(
        &self,
        equipment_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<AvailabilityOverride>, AppError>;
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn find_equipment(&self, equipment_id: Uuid) -> Result<Option<Equipment>, AppError> {
        queries::find_equipment(&self.pool, equipment_id).await
    }

    async fn find_reservations_overlapping(
        &self,
        equipment_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<ReservationWindow>, AppError> {
        queries::find_reservations_overlapping(&self.pool, equipment_id, from, until).await
    }

    async fn find_availability_overrides(
        &self,
        equipment_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<AvailabilityOverride>, AppError> {
        queries::find_availability_overrides(&self.pool, equipment_id, from, until).await
    }
}
