//! Booking service functions with store access.
//!
//! These functions combine the cache, the store, the calculator and the
//! conflict checker for the HTTP handlers.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

use super::calculators::{calculate_for_range, BookingCalculation, CustomRates};
use super::conflicts::{check_booking_conflicts, AvailabilityState, ConflictCheck};
use super::dates::DateRange;
use super::models::Equipment;
use super::payment::{PaymentBookingData, PaymentIntent};
use super::requests::{BookingQuoteRequest, CheckoutRequest, ConflictCheckRequest};
use super::responses::ConflictCheckResponse;
use super::BookingError;

/// A priced booking with the listing it was priced against
#[derive(Debug, Clone)]
pub struct Quote {
    pub equipment: Arc<Equipment>,
    pub range: DateRange,
    pub calculation: BookingCalculation,
}

/// Load a rentable equipment listing, cache first.
pub async fn load_equipment(state: &AppState, equipment_id: Uuid) -> Result<Arc<Equipment>, AppError> {
    let equipment = if let Some(cached) = state.cache.equipment.get(&equipment_id).await {
        debug!("Cache HIT for equipment: {}", equipment_id);
        cached
    } else {
        debug!("Cache MISS for equipment: {}", equipment_id);
        let mut equipment = state
            .store
            .find_equipment(equipment_id)
            .await?
            .ok_or(BookingError::EquipmentNotFound(equipment_id))?;
        if equipment.currency.is_empty() {
            equipment.currency = state.config.default_currency.clone();
        }
        let equipment = Arc::new(equipment);
        state.cache.equipment.insert(equipment_id, equipment.clone()).await;
        equipment
    };

    if !equipment.is_active {
        return Err(BookingError::EquipmentInactive(equipment_id).into());
    }
    Ok(equipment)
}

/// Owner-set nightly rates for the nights of `range`
pub async fn load_custom_rates(
    state: &AppState,
    equipment_id: Uuid,
    range: &DateRange,
) -> Result<CustomRates, AppError> {
    let overrides = state
        .store
        .find_availability_overrides(equipment_id, range.from, range.end_exclusive())
        .await?;

    Ok(overrides
        .into_iter()
        .filter_map(|o| o.custom_rate.map(|rate| (o.date, rate)))
        .collect())
}

/// Price a booking request.
pub async fn quote_booking(state: &AppState, request: &BookingQuoteRequest) -> Result<Quote, AppError> {
    let range = DateRange::parse(&request.start_date, &request.end_date)?;
    let equipment = load_equipment(state, request.equipment_id).await?;
    let custom_rates = load_custom_rates(state, equipment.id, &range).await?;

    let calculation = calculate_for_range(
        equipment.daily_rate,
        &range,
        Some(&custom_rates),
        request.insurance_tier,
        equipment.damage_deposit,
        &state.config.pricing,
    )?;

    Ok(Quote {
        equipment,
        range,
        calculation,
    })
}

/// Check availability for a request.
///
/// With a session id the check goes through that session's monitor, and a
/// response overtaken by a newer check from the same session is reported as
/// superseded.
pub async fn check_availability(
    state: &AppState,
    request: &ConflictCheckRequest,
) -> Result<ConflictCheckResponse, AppError> {
    let range = DateRange::parse(&request.start_date, &request.end_date)?;
    let timeout = state.config.conflict_check_timeout;

    let Some(session_id) = request.session_id.as_deref() else {
        let check = check_booking_conflicts(state.store.as_ref(), request.equipment_id, &range, timeout).await;
        return Ok(ConflictCheckResponse::from_check(check, None));
    };

    let monitor = state.cache.monitor_for(session_id).await;
    let (request_id, published) = monitor
        .run(state.store.as_ref(), request.equipment_id, &range, timeout)
        .await;

    Ok(match published {
        Some(AvailabilityState::Ready { conflicts, .. }) => {
            ConflictCheckResponse::from_check(ConflictCheck::Checked(conflicts), Some(request_id.value()))
        }
        Some(AvailabilityState::TimedOut { .. }) => {
            ConflictCheckResponse::from_check(ConflictCheck::TimedOut, Some(request_id.value()))
        }
        _ => ConflictCheckResponse::superseded(request_id.value()),
    })
}

/// Price, re-check availability and hand the booking to the payment service.
pub async fn prepare_checkout(
    state: &AppState,
    request: &CheckoutRequest,
) -> Result<(PaymentBookingData, PaymentIntent), AppError> {
    let quote = quote_booking(state, request).await?;

    let check = check_booking_conflicts(
        state.store.as_ref(),
        quote.equipment.id,
        &quote.range,
        state.config.conflict_check_timeout,
    )
    .await;

    match check {
        ConflictCheck::TimedOut => return Err(BookingError::AvailabilityTimedOut.into()),
        ConflictCheck::Checked(conflicts) if !conflicts.is_empty() => {
            return Err(BookingError::Conflicted(conflicts).into());
        }
        ConflictCheck::Checked(_) => {}
    }

    let data = PaymentBookingData::from_calculation(
        quote.equipment.id,
        &quote.range,
        request.insurance_tier,
        &quote.calculation,
        &quote.equipment.currency,
    );
    let intent = state.payments.create_payment_intent(&data).await?;

    info!(
        "Checkout prepared for equipment {} ({} to {}), total {}",
        data.equipment_id, data.start_date, data.end_date, data.total_amount
    );
    Ok((data, intent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::insurance::InsuranceTier;
    use crate::booking::payment::testing::RecordingGateway;
    use crate::booking::responses::AvailabilityStatus;
    use crate::booking::store::testing::InMemoryBookingStore;
    use crate::test_support::state_with;
    use rust_decimal_macros::dec;

    fn quote_request(equipment_id: Uuid, start: &str, end: &str, tier: InsuranceTier) -> BookingQuoteRequest {
        BookingQuoteRequest {
            equipment_id,
            start_date: start.to_string(),
            end_date: end.to_string(),
            insurance_tier: tier,
        }
    }

    #[tokio::test]
    async fn test_quote_uses_equipment_rates() {
        let id = Uuid::new_v4();
        let store = InMemoryBookingStore::default().with_equipment(id, dec!(50), dec!(100));
        let (state, _) = state_with(store, RecordingGateway::default());

        let quote = quote_booking(&state, &quote_request(id, "2024-07-01", "2024-07-04", InsuranceTier::Basic))
            .await
            .unwrap();

        assert_eq!(quote.calculation.subtotal, dec!(150));
        assert_eq!(quote.calculation.total, dec!(172.50));
        assert_eq!(quote.calculation.deposit, dec!(100));
    }

    #[tokio::test]
    async fn test_quote_applies_custom_rates() {
        let id = Uuid::new_v4();
        let store = InMemoryBookingStore::default()
            .with_equipment(id, dec!(50), dec!(0))
            .with_override(id, "2024-07-05", true, Some(dec!(75)))
            .with_override(id, "2024-07-06", true, Some(dec!(75)));
        let (state, _) = state_with(store, RecordingGateway::default());

        let quote = quote_booking(&state, &quote_request(id, "2024-07-04", "2024-07-07", InsuranceTier::None))
            .await
            .unwrap();

        assert_eq!(quote.calculation.subtotal, dec!(200)); // 50 + 75 + 75
    }

    #[tokio::test]
    async fn test_quote_unknown_equipment() {
        let (state, _) = state_with(InMemoryBookingStore::default(), RecordingGateway::default());
        let err = quote_booking(
            &state,
            &quote_request(Uuid::new_v4(), "2024-07-01", "2024-07-02", InsuranceTier::None),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Booking(BookingError::EquipmentNotFound(_))));
    }

    #[tokio::test]
    async fn test_quote_inactive_equipment() {
        let id = Uuid::new_v4();
        let mut store = InMemoryBookingStore::default().with_equipment(id, dec!(50), dec!(0));
        store.equipment[0].is_active = false;
        let (state, _) = state_with(store, RecordingGateway::default());

        let err = quote_booking(&state, &quote_request(id, "2024-07-01", "2024-07-02", InsuranceTier::None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Booking(BookingError::EquipmentInactive(_))));
    }

    #[tokio::test]
    async fn test_missing_currency_uses_default() {
        let id = Uuid::new_v4();
        let mut store = InMemoryBookingStore::default().with_equipment(id, dec!(50), dec!(0));
        store.equipment[0].currency = String::new();
        let (state, _) = state_with(store, RecordingGateway::default());

        let quote = quote_booking(&state, &quote_request(id, "2024-07-01", "2024-07-02", InsuranceTier::None))
            .await
            .unwrap();
        assert_eq!(quote.equipment.currency, "USD");

        // Served from cache the second time
        assert!(state.cache.equipment.get(&id).await.is_some());
    }

    #[tokio::test]
    async fn test_checkout_sends_payment_data() {
        let id = Uuid::new_v4();
        let store = InMemoryBookingStore::default()
            .with_equipment(id, dec!(50), dec!(100))
            .with_booking(id, "2024-06-10", "2024-06-15", "approved");
        let (state, gateway) = state_with(store, RecordingGateway::default());

        let (data, intent) = prepare_checkout(
            &state,
            &quote_request(id, "2024-06-15", "2024-06-18", InsuranceTier::Premium),
        )
        .await
        .unwrap();

        assert_eq!(data.total_amount, dec!(180.00)); // 150 + 7.50 + 22.50
        assert_eq!(data.insurance_cost, dec!(22.50));
        assert_eq!(data.deposit_amount, dec!(100));
        assert_eq!(intent.payment_intent_id, "pi_1");
        assert_eq!(gateway.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_refuses_conflicts() {
        let id = Uuid::new_v4();
        let store = InMemoryBookingStore::default()
            .with_equipment(id, dec!(50), dec!(100))
            .with_booking(id, "2024-06-10", "2024-06-15", "active");
        let (state, gateway) = state_with(store, RecordingGateway::default());

        let err = prepare_checkout(
            &state,
            &quote_request(id, "2024-06-12", "2024-06-20", InsuranceTier::None),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Booking(BookingError::Conflicted(ref c)) if c.len() == 1));
        assert!(gateway.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_day_checkout_holds_its_night() {
        let id = Uuid::new_v4();
        let store = InMemoryBookingStore::default().with_equipment(id, dec!(50), dec!(0));
        let (state, _) = state_with(store, RecordingGateway::default());

        let (data, _) = prepare_checkout(
            &state,
            &quote_request(id, "2024-07-01", "2024-07-01", InsuranceTier::None),
        )
        .await
        .unwrap();
        assert_eq!(data.start_date, "2024-07-01");
        assert_eq!(data.end_date, "2024-07-02");

        // Once the backend stores the payload, the same night is taken
        let booked = InMemoryBookingStore::default()
            .with_equipment(id, dec!(50), dec!(0))
            .with_booking(id, &data.start_date, &data.end_date, "approved");
        let (state, gateway) = state_with(booked, RecordingGateway::default());

        let err = prepare_checkout(
            &state,
            &quote_request(id, "2024-07-01", "2024-07-01", InsuranceTier::None),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Booking(BookingError::Conflicted(ref c)) if c.len() == 1));
        assert!(gateway.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_checks_report_latest() {
        let id = Uuid::new_v4();
        let store = InMemoryBookingStore::default()
            .with_equipment(id, dec!(50), dec!(100))
            .with_booking(id, "2024-06-10", "2024-06-15", "approved");
        let (state, _) = state_with(store, RecordingGateway::default());

        let request = ConflictCheckRequest {
            equipment_id: id,
            start_date: "2024-06-12".to_string(),
            end_date: "2024-06-20".to_string(),
            session_id: Some("renter-1".to_string()),
        };
        let response = check_availability(&state, &request).await.unwrap();
        assert_eq!(response.status, AvailabilityStatus::Conflicted);
        assert_eq!(response.request_id, Some(1));

        let monitor = state.cache.monitor_for("renter-1").await;
        assert!(matches!(monitor.current(), AvailabilityState::Ready { .. }));
    }
}
