//! Booking route handlers

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::AppState;

use super::insurance::InsuranceTier;
use super::requests::{BookingQuoteRequest, CheckoutRequest, ConflictCheckRequest};
use super::responses::{
    AvailabilitySessionResponse, BookingQuoteResponse, CheckoutResponse, ConflictCheckResponse,
    InsuranceTierResponse, MoneyResponse,
};
use super::services;

/// Booking API routes, mounted under `/api/booking`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/insurance-tiers", get(insurance_tiers))
        .route("/quote", post(quote))
        .route("/conflicts", post(conflicts))
        .route("/availability/:session_id", get(availability_session))
        .route("/checkout", post(checkout))
}

/// Insurance options with the configured rates
pub async fn insurance_tiers(State(state): State<AppState>) -> Json<Vec<InsuranceTierResponse>> {
    let tiers = InsuranceTier::all()
        .into_iter()
        .map(|tier| InsuranceTierResponse {
            tier,
            description: tier.coverage_description().to_string(),
            rate: tier.rate(&state.config.pricing),
            claim_ceiling: tier.claim_ceiling(),
        })
        .collect();
    Json(tiers)
}

/// Price a booking
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<BookingQuoteRequest>,
) -> Result<Json<BookingQuoteResponse>> {
    let quote = services::quote_booking(&state, &request).await?;
    let currency = quote.equipment.currency.as_str();
    let calc = &quote.calculation;

    Ok(Json(BookingQuoteResponse {
        equipment_id: quote.equipment.id,
        start_date: quote.range.start_string(),
        end_date: quote.range.end_string(),
        days: calc.days,
        insurance_tier: request.insurance_tier,
        daily_rate: MoneyResponse::new(quote.equipment.daily_rate, currency),
        subtotal: MoneyResponse::new(calc.subtotal, currency),
        service_fee: MoneyResponse::new(calc.service_fee, currency),
        insurance: MoneyResponse::new(calc.insurance, currency),
        deposit: MoneyResponse::new(calc.deposit, currency),
        total: MoneyResponse::new(calc.total, currency),
    }))
}

/// Check a date range against bookings and blocked dates
pub async fn conflicts(
    State(state): State<AppState>,
    Json(request): Json<ConflictCheckRequest>,
) -> Result<Json<ConflictCheckResponse>> {
    Ok(Json(services::check_availability(&state, &request).await?))
}

/// Latest availability state for a client session
pub async fn availability_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<AvailabilitySessionResponse>> {
    let monitor = state
        .cache
        .existing_monitor(&session_id)
        .await
        .ok_or(AppError::NotFound)?;

    Ok(Json(AvailabilitySessionResponse {
        state: monitor.current(),
        session_id,
    }))
}

/// Re-check and hand the booking to the payment service
pub async fn checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let (booking, payment_intent) = services::prepare_checkout(&state, &request).await?;
    Ok(Json(CheckoutResponse {
        booking,
        payment_intent,
    }))
}

/// Drop a cached equipment listing after the owner edits it
pub async fn invalidate_equipment(
    State(state): State<AppState>,
    Path(equipment_id): Path<Uuid>,
) -> Json<crate::cache::CacheStats> {
    state.cache.invalidate_equipment(equipment_id).await;
    Json(state.cache.stats())
}
