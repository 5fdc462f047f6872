//! Response DTOs for booking API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::conflicts::{AvailabilityState, BookingConflict, ConflictCheck};
use super::insurance::InsuranceTier;
use super::payment::{PaymentBookingData, PaymentIntent};

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// Response for a booking quote
#[derive(Debug, Serialize)]
pub struct BookingQuoteResponse {
    pub equipment_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    pub days: i64,
    pub insurance_tier: InsuranceTier,
    pub daily_rate: MoneyResponse,
    pub subtotal: MoneyResponse,
    pub service_fee: MoneyResponse,
    pub insurance: MoneyResponse,
    pub deposit: MoneyResponse,
    pub total: MoneyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Conflicted,
    TimedOut,
    /// A newer check from the same session replaced this one
    Superseded,
}

/// Response for a conflict check
#[derive(Debug, Serialize)]
pub struct ConflictCheckResponse {
    pub status: AvailabilityStatus,
    pub conflicts: Vec<BookingConflict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
}

impl ConflictCheckResponse {
    pub fn from_check(check: ConflictCheck, request_id: Option<u64>) -> Self {
        match check {
            ConflictCheck::Checked(conflicts) => Self {
                status: if conflicts.is_empty() {
                    AvailabilityStatus::Available
                } else {
                    AvailabilityStatus::Conflicted
                },
                conflicts,
                request_id,
            },
            ConflictCheck::TimedOut => Self {
                status: AvailabilityStatus::TimedOut,
                conflicts: vec![],
                request_id,
            },
        }
    }

    pub fn superseded(request_id: u64) -> Self {
        Self {
            status: AvailabilityStatus::Superseded,
            conflicts: vec![],
            request_id: Some(request_id),
        }
    }
}

/// Current monitor state for a client session
#[derive(Debug, Serialize)]
pub struct AvailabilitySessionResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub state: AvailabilityState,
}

/// One insurance option
#[derive(Debug, Serialize)]
pub struct InsuranceTierResponse {
    pub tier: InsuranceTier,
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub claim_ceiling: Option<Decimal>,
}

/// Response for checkout: the hand-off payload and the created intent
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub booking: PaymentBookingData,
    pub payment_intent: PaymentIntent,
}

/// Generic error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
