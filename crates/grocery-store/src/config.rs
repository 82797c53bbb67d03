//! Storefront configuration loaded from environment variables.
//!
//! Every variable is optional; defaults reproduce the stock storefront.
//!
//! - `GROCERY_DELIVERY_FEE` - Flat fee added to every order (default: 40)
//! - `GROCERY_PROCESSING_DELAY_MS` - Simulated order processing time (default: 2000)
//! - `GROCERY_PREPARING_AFTER_MS` - Time from creation to `preparing` (default: 5000)
//! - `GROCERY_OUT_FOR_DELIVERY_AFTER_MS` - Time from creation to `out_for_delivery` (default: 10000)
//! - `GROCERY_COURIER_TICK_MS` - Courier position update interval (default: 3000)
//! - `GROCERY_COURIER_JITTER` - Width in degrees of the per-tick courier drift (default: 0.001)
//! - `GROCERY_SHOP_RADIUS_KM` - Nearby-shop search radius (default: 2)
//! - `GROCERY_ACTOR_BUFFER` - Channel capacity of each store (default: 32)
//! - `GROCERY_RNG_SEED` - Seed for ids, courier choice and drift (default: from entropy)

use crate::catalog;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Inconsistent configuration: {0}")]
    Inconsistent(String),
}

/// Timing and pricing of the order lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSchedule {
    pub delivery_fee: f64,
    /// Both transition delays are measured from order creation.
    pub preparing_after: Duration,
    pub out_for_delivery_after: Duration,
    pub courier_tick: Duration,
    /// Each tick moves the courier by up to half this many degrees per axis.
    pub courier_jitter: f64,
    pub estimated_delivery: String,
}

impl Default for OrderSchedule {
    fn default() -> Self {
        Self {
            delivery_fee: 40.0,
            preparing_after: Duration::from_secs(5),
            out_for_delivery_after: Duration::from_secs(10),
            courier_tick: Duration::from_secs(3),
            courier_jitter: 0.001,
            estimated_delivery: catalog::ESTIMATED_DELIVERY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub orders: OrderSchedule,
    pub processing_delay: Duration,
    pub shop_radius_km: f64,
    pub actor_buffer: usize,
    pub rng_seed: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            orders: OrderSchedule::default(),
            processing_delay: Duration::from_secs(2),
            shop_radius_km: 2.0,
            actor_buffer: 32,
            rng_seed: None,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let orders = OrderSchedule {
            delivery_fee: parse_or(&lookup, "GROCERY_DELIVERY_FEE", defaults.orders.delivery_fee)?,
            preparing_after: millis_or(
                &lookup,
                "GROCERY_PREPARING_AFTER_MS",
                defaults.orders.preparing_after,
            )?,
            out_for_delivery_after: millis_or(
                &lookup,
                "GROCERY_OUT_FOR_DELIVERY_AFTER_MS",
                defaults.orders.out_for_delivery_after,
            )?,
            courier_tick: millis_or(&lookup, "GROCERY_COURIER_TICK_MS", defaults.orders.courier_tick)?,
            courier_jitter: parse_or(
                &lookup,
                "GROCERY_COURIER_JITTER",
                defaults.orders.courier_jitter,
            )?,
            estimated_delivery: defaults.orders.estimated_delivery,
        };

        let config = Self {
            orders,
            processing_delay: millis_or(
                &lookup,
                "GROCERY_PROCESSING_DELAY_MS",
                defaults.processing_delay,
            )?,
            shop_radius_km: parse_or(&lookup, "GROCERY_SHOP_RADIUS_KM", defaults.shop_radius_km)?,
            actor_buffer: parse_or(&lookup, "GROCERY_ACTOR_BUFFER", defaults.actor_buffer)?,
            rng_seed: lookup("GROCERY_RNG_SEED")
                .map(|raw| parse("GROCERY_RNG_SEED", &raw))
                .transpose()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let orders = &self.orders;
        if !orders.delivery_fee.is_finite() || orders.delivery_fee < 0.0 {
            return Err(ConfigError::Inconsistent(format!(
                "delivery fee must be a non-negative amount, got {}",
                orders.delivery_fee
            )));
        }
        if orders.out_for_delivery_after <= orders.preparing_after {
            return Err(ConfigError::Inconsistent(
                "out_for_delivery must come after preparing".to_string(),
            ));
        }
        if orders.courier_tick.is_zero() {
            return Err(ConfigError::Inconsistent(
                "courier tick must be non-zero".to_string(),
            ));
        }
        if !orders.courier_jitter.is_finite() || orders.courier_jitter < 0.0 {
            return Err(ConfigError::Inconsistent(format!(
                "courier jitter must be non-negative, got {}",
                orders.courier_jitter
            )));
        }
        if !self.shop_radius_km.is_finite() || self.shop_radius_km <= 0.0 {
            return Err(ConfigError::Inconsistent(format!(
                "shop radius must be a positive distance, got {}",
                self.shop_radius_km
            )));
        }
        if self.actor_buffer == 0 {
            return Err(ConfigError::Inconsistent(
                "actor buffer must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| parse(key, &raw))
}

fn millis_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(lookup(key)
        .map(|raw| parse::<u64>(key, &raw))
        .transpose()?
        .map_or(default, Duration::from_millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.orders.delivery_fee, 40.0);
        assert_eq!(config.orders.preparing_after, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("GROCERY_DELIVERY_FEE", "25.5"),
            ("GROCERY_COURIER_TICK_MS", " 500 "),
            ("GROCERY_RNG_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(config.orders.delivery_fee, 25.5);
        assert_eq!(config.orders.courier_tick, Duration::from_millis(500));
        assert_eq!(config.rng_seed, Some(42));
    }

    #[test]
    fn test_unparseable_value_names_the_variable() {
        let err = StoreConfig::from_lookup(lookup(&[("GROCERY_ACTOR_BUFFER", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "GROCERY_ACTOR_BUFFER"));
    }

    #[test]
    fn test_transitions_must_be_ordered() {
        let err = StoreConfig::from_lookup(lookup(&[
            ("GROCERY_PREPARING_AFTER_MS", "10000"),
            ("GROCERY_OUT_FOR_DELIVERY_AFTER_MS", "10000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Inconsistent(_)));
    }

    #[test]
    fn test_negative_fee_is_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[("GROCERY_DELIVERY_FEE", "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::Inconsistent(_)));
    }

    #[test]
    fn test_radius_must_be_positive() {
        for raw in ["0", "-2", "NaN"] {
            let err =
                StoreConfig::from_lookup(lookup(&[("GROCERY_SHOP_RADIUS_KM", raw)])).unwrap_err();
            assert!(matches!(err, ConfigError::Inconsistent(_)), "radius {raw}");
        }
    }

    #[test]
    fn test_hand_built_config_is_checked() {
        let mut config = StoreConfig::default();
        config.orders.courier_tick = Duration::ZERO;
        assert!(config.validate().is_err());

        let config = StoreConfig {
            actor_buffer: 0,
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
