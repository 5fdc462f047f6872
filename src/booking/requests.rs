//! Request DTOs for booking API endpoints.

use serde::Deserialize;
use uuid::Uuid;

use super::insurance::InsuranceTier;

/// Request to price a booking
#[derive(Debug, Clone, Deserialize)]
pub struct BookingQuoteRequest {
    pub equipment_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub insurance_tier: InsuranceTier,
}

/// Request to check a date range for conflicts
#[derive(Debug, Clone, Deserialize)]
pub struct ConflictCheckRequest {
    pub equipment_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    /// Client session; when set, older checks from the same session are superseded
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Checkout takes the same inputs as a quote
pub type CheckoutRequest = BookingQuoteRequest;
