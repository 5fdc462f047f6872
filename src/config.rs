//! Runtime configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::booking::PricingPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub payment_intent_url: String,
    pub payment_api_key: Option<String>,
    pub pricing: PricingPolicy,
    pub conflict_check_timeout: Duration,
    pub default_currency: String,
}

impl Config {
    /// Load from process environment (after `.env`, if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let defaults = PricingPolicy::default();
        let pricing = PricingPolicy {
            service_fee_rate: parse_or(&lookup, "SERVICE_FEE_RATE", defaults.service_fee_rate)?,
            basic_insurance_rate: parse_or(&lookup, "INSURANCE_BASIC_RATE", defaults.basic_insurance_rate)?,
            premium_insurance_rate: parse_or(
                &lookup,
                "INSURANCE_PREMIUM_RATE",
                defaults.premium_insurance_rate,
            )?,
        };
        pricing.validate().map_err(|e| ConfigError::Invalid {
            name: "pricing rates",
            value: e.to_string(),
        })?;

        let timeout_ms: u64 = parse_or(&lookup, "CONFLICT_CHECK_TIMEOUT_MS", 5000)?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            payment_intent_url: required("PAYMENT_INTENT_URL")?,
            payment_api_key: lookup("PAYMENT_API_KEY").filter(|k| !k.is_empty()),
            pricing,
            conflict_check_timeout: Duration::from_millis(timeout_ms),
            default_currency: lookup("DEFAULT_CURRENCY").unwrap_or_else(|| "USD".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
