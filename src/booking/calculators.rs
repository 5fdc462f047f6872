//! Core booking price calculation.
//!
//! Pure functions for pricing math - no database access.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use super::dates::DateRange;
use super::insurance::{calculate_insurance_cost, InsuranceTier};
use super::BookingError;

/// Per-night rate overrides set by the owner (date -> nightly rate)
pub type CustomRates = HashMap<NaiveDate, Decimal>;

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use gear_rental_booking::booking::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Fee and insurance rates applied on top of the rental subtotal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingPolicy {
    pub service_fee_rate: Decimal,
    pub basic_insurance_rate: Decimal,
    pub premium_insurance_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            service_fee_rate: Decimal::new(5, 2),
            basic_insurance_rate: Decimal::new(10, 2),
            premium_insurance_rate: Decimal::new(15, 2),
        }
    }
}

impl PricingPolicy {
    /// Reject rates outside `[0, 1]`
    pub fn validate(&self) -> Result<(), BookingError> {
        let rates = [
            ("service fee", self.service_fee_rate),
            ("basic insurance", self.basic_insurance_rate),
            ("premium insurance", self.premium_insurance_rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(BookingError::InvalidInput(format!(
                    "{} rate {} must be between 0 and 1",
                    name, rate
                )));
            }
        }
        Ok(())
    }
}

/// Cost breakdown for a proposed booking.
///
/// The deposit is refundable and is never part of `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingCalculation {
    pub subtotal: Decimal,
    pub service_fee: Decimal,
    pub insurance: Decimal,
    pub deposit: Decimal,
    pub total: Decimal,
    pub days: i64,
}

/// Calculate the booking total from storage-formatted dates.
///
/// Each night costs its custom rate when one is set, otherwise `daily_rate`.
/// Service fee and insurance are percentages of the subtotal, rounded to cents.
pub fn calculate_booking_total(
    daily_rate: Decimal,
    start_date: &str,
    end_date: &str,
    custom_rates: Option<&CustomRates>,
    insurance_tier: InsuranceTier,
    damage_deposit: Decimal,
    policy: &PricingPolicy,
) -> Result<BookingCalculation, BookingError> {
    let range = DateRange::parse(start_date, end_date)?;
    calculate_for_range(daily_rate, &range, custom_rates, insurance_tier, damage_deposit, policy)
}

/// Same as [`calculate_booking_total`] for an already-parsed range.
pub fn calculate_for_range(
    daily_rate: Decimal,
    range: &DateRange,
    custom_rates: Option<&CustomRates>,
    insurance_tier: InsuranceTier,
    damage_deposit: Decimal,
    policy: &PricingPolicy,
) -> Result<BookingCalculation, BookingError> {
    if daily_rate <= Decimal::ZERO {
        return Err(BookingError::InvalidInput(format!(
            "daily rate must be positive, got {}",
            daily_rate
        )));
    }
    if damage_deposit < Decimal::ZERO {
        return Err(BookingError::InvalidInput(format!(
            "damage deposit cannot be negative, got {}",
            damage_deposit
        )));
    }

    let mut subtotal = Decimal::ZERO;
    for night in range.night_dates() {
        let rate = custom_rates
            .and_then(|rates| rates.get(&night))
            .copied()
            .unwrap_or(daily_rate);
        if rate < Decimal::ZERO {
            return Err(BookingError::InvalidInput(format!(
                "custom rate for {} cannot be negative",
                night
            )));
        }
        subtotal = subtotal
            .checked_add(rate)
            .ok_or_else(|| BookingError::InvalidInput("subtotal overflow".to_string()))?;
    }

    let service_fee = round_money(subtotal * policy.service_fee_rate, 2);
    let insurance = calculate_insurance_cost(subtotal, insurance_tier, policy);
    let total = subtotal
        .checked_add(service_fee)
        .and_then(|t| t.checked_add(insurance))
        .ok_or_else(|| BookingError::InvalidInput("total overflow".to_string()))?;

    Ok(BookingCalculation {
        subtotal,
        service_fee,
        insurance,
        deposit: damage_deposit,
        total,
        days: range.nights(),
    })
}
