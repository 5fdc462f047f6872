//! Booking engine for gear rentals.
//!
//! Prices a proposed rental (nightly rates, service fee, insurance, deposit)
//! and checks the range against existing bookings and owner-blocked dates.
//! Creating the booking row and charging the renter happen outside this
//! crate; the terminal output is a [`PaymentBookingData`] handed to the
//! payment gateway.

pub mod calculators;
pub mod conflicts;
pub mod dates;
pub mod insurance;
pub mod models;
pub mod payment;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod store;

use uuid::Uuid;

// Re-export commonly used items
pub use calculators::{calculate_booking_total, round_money, BookingCalculation, CustomRates, PricingPolicy};
pub use conflicts::{check_booking_conflicts, AvailabilityMonitor, BookingConflict, ConflictCheck};
pub use dates::DateRange;
pub use insurance::{calculate_insurance_cost, InsuranceTier};
pub use payment::{PaymentBookingData, PaymentGateway};
pub use routes::router;
pub use store::BookingStore;

/// Booking calculation and checkout errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Equipment {0} not found")]
    EquipmentNotFound(Uuid),

    #[error("Equipment {0} is not available for rent")]
    EquipmentInactive(Uuid),

    #[error("Requested dates conflict with {} existing booking(s) or blocked date(s)", .0.len())]
    Conflicted(Vec<BookingConflict>),

    #[error("Availability check timed out, please retry")]
    AvailabilityTimedOut,

    #[error("Payment error: {0}")]
    Payment(String),
}
