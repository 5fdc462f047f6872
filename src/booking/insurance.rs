//! Insurance tiers offered at checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::calculators::{round_money, PricingPolicy};
use super::BookingError;

/// Damage insurance tier chosen by the renter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsuranceTier {
    #[default]
    None,
    Basic,
    Premium,
}

impl InsuranceTier {
    pub fn all() -> [InsuranceTier; 3] {
        [InsuranceTier::None, InsuranceTier::Basic, InsuranceTier::Premium]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InsuranceTier::None => "none",
            InsuranceTier::Basic => "basic",
            InsuranceTier::Premium => "premium",
        }
    }

    pub fn coverage_description(&self) -> &'static str {
        match self {
            InsuranceTier::None => "No coverage. You are responsible for all damage.",
            InsuranceTier::Basic => "Covers accidental damage up to $500.",
            InsuranceTier::Premium => "Covers accidental damage and theft up to $2,000.",
        }
    }

    /// Largest claim the tier pays out, if any
    pub fn claim_ceiling(&self) -> Option<Decimal> {
        match self {
            InsuranceTier::None => None,
            InsuranceTier::Basic => Some(Decimal::new(500, 0)),
            InsuranceTier::Premium => Some(Decimal::new(2000, 0)),
        }
    }

    /// Cost rate applied to the rental subtotal under `policy`
    pub fn rate(&self, policy: &PricingPolicy) -> Decimal {
        match self {
            InsuranceTier::None => Decimal::ZERO,
            InsuranceTier::Basic => policy.basic_insurance_rate,
            InsuranceTier::Premium => policy.premium_insurance_rate,
        }
    }
}

impl fmt::Display for InsuranceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsuranceTier {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(InsuranceTier::None),
            "basic" => Ok(InsuranceTier::Basic),
            "premium" => Ok(InsuranceTier::Premium),
            other => Err(BookingError::InvalidInput(format!(
                "unknown insurance tier '{}'",
                other
            ))),
        }
    }
}

/// Insurance cost for a subtotal, rounded to cents. `None` is always zero.
pub fn calculate_insurance_cost(
    subtotal: Decimal,
    tier: InsuranceTier,
    policy: &PricingPolicy,
) -> Decimal {
    if tier == InsuranceTier::None {
        return Decimal::ZERO;
    }
    round_money(subtotal * tier.rate(policy), 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_none_is_always_zero() {
        let policy = PricingPolicy::default();
        assert_eq!(calculate_insurance_cost(dec!(150), InsuranceTier::None, &policy), dec!(0));
        assert_eq!(calculate_insurance_cost(dec!(0), InsuranceTier::None, &policy), dec!(0));
    }

    #[test]
    fn test_default_rates() {
        let policy = PricingPolicy::default();
        assert_eq!(calculate_insurance_cost(dec!(150), InsuranceTier::Basic, &policy), dec!(15.00));
        assert_eq!(calculate_insurance_cost(dec!(150), InsuranceTier::Premium, &policy), dec!(22.50));
    }

    #[test]
    fn test_cost_rounds_to_cents() {
        let policy = PricingPolicy::default();
        // 33.33 * 0.10 = 3.333
        assert_eq!(calculate_insurance_cost(dec!(33.33), InsuranceTier::Basic, &policy), dec!(3.33));
    }

    #[test]
    fn test_custom_policy_rates() {
        let policy = PricingPolicy {
            basic_insurance_rate: dec!(0.08),
            ..PricingPolicy::default()
        };
        assert_eq!(calculate_insurance_cost(dec!(100), InsuranceTier::Basic, &policy), dec!(8.00));
    }

    #[test]
    fn test_parse_tier() {
        assert_eq!("basic".parse::<InsuranceTier>().unwrap(), InsuranceTier::Basic);
        assert_eq!("PREMIUM".parse::<InsuranceTier>().unwrap(), InsuranceTier::Premium);
        assert_eq!("".parse::<InsuranceTier>().unwrap(), InsuranceTier::None);
        assert!("gold".parse::<InsuranceTier>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&InsuranceTier::Premium).unwrap();
        assert_eq!(json, "\"premium\"");
        let tier: InsuranceTier = serde_json::from_str("\"basic\"").unwrap();
        assert_eq!(tier, InsuranceTier::Basic);
    }

    #[test]
    fn test_claim_ceilings() {
        assert_eq!(InsuranceTier::None.claim_ceiling(), None);
        assert_eq!(InsuranceTier::Basic.claim_ceiling(), Some(dec!(500)));
        assert_eq!(InsuranceTier::Premium.claim_ceiling(), Some(dec!(2000)));
    }
}
