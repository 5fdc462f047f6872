//! Database queries for the booking engine.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{AvailabilityOverride, Equipment, ReservationWindow, BLOCKING_STATUSES};

/// Get an equipment listing by id
pub async fn find_equipment(pool: &PgPool, equipment_id: Uuid) -> Result<Option<Equipment>, AppError> {
    let equipment = sqlx::query_as::<_, Equipment>(
        r#"
        SELECT id, title, daily_rate, damage_deposit, currency, is_active
        FROM equipment
        WHERE id = $1
        "#,
    )
    .bind(equipment_id)
    .fetch_optional(pool)
    .await?;

    Ok(equipment)
}

/// Find holding bookings whose `[start_date, end_date)` intersects `[from, until)`
pub async fn find_reservations_overlapping(
    pool: &PgPool,
    equipment_id: Uuid,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<ReservationWindow>, AppError> {
    let statuses: Vec<String> = BLOCKING_STATUSES.iter().map(|s| s.to_string()).collect();

    let reservations = sqlx::query_as::<_, ReservationWindow>(
        r#"
        SELECT id, start_date, end_date, status
        FROM bookings
        WHERE equipment_id = $1
          AND status = ANY($2)
          AND start_date < $4
          AND end_date > $3
        ORDER BY start_date
        "#,
    )
    .bind(equipment_id)
    .bind(&statuses[..])
    .bind(from)
    .bind(until)
    .fetch_all(pool)
    .await?;

    Ok(reservations)
}

/// Owner calendar rows for nights in `[from, until)`
pub async fn find_availability_overrides(
    pool: &PgPool,
    equipment_id: Uuid,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<AvailabilityOverride>, AppError> {
    let overrides = sqlx::query_as::<_, AvailabilityOverride>(
        r#"
        SELECT date, is_available, custom_rate
        FROM availability_calendar
        WHERE equipment_id = $1
          AND date >= $2
          AND date < $3
        ORDER BY date
        "#,
    )
    .bind(equipment_id)
    .bind(from)
    .bind(until)
    .fetch_all(pool)
    .await?;

    Ok(overrides)
}
