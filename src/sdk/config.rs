use crate::sdk::routing::error::TransportError;
use crate::sdk::routing::provider::types::{RequestOptions, ShapeMatch, Units};
use crate::sdk::routing::provider::ValhallaProvider;
use crate::sdk::routing::trace::TraceConfig;
use crate::sdk::util::rate_limit::per_minute_limiter;
use std::env;
use std::num::{NonZeroU32, NonZeroUsize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8002";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value \"{value}\" for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValhallaConfig {
    pub base_url: String,
    pub options: RequestOptions,
    pub trace: TraceConfig,
    pub timeout: Duration,
    /// `None` leaves requests unthrottled.
    pub requests_per_minute: Option<NonZeroU32>,
}

impl Default for ValhallaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            options: RequestOptions::default(),
            trace: TraceConfig::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            requests_per_minute: None,
        }
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

fn parse_units(value: String) -> Result<Units, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "miles" => Ok(Units::Miles),
        "kilometers" | "km" => Ok(Units::Kilometers),
        _ => Err(ConfigError::Invalid {
            key: "VALHALLA_UNITS",
            value,
            reason: "expected `miles` or `kilometers`".to_string(),
        }),
    }
}

fn parse_shape_match(value: String) -> Result<ShapeMatch, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "map_snap" => Ok(ShapeMatch::MapSnap),
        "edge_walk" => Ok(ShapeMatch::EdgeWalk),
        "walk_or_snap" => Ok(ShapeMatch::WalkOrSnap),
        _ => Err(ConfigError::Invalid {
            key: "VALHALLA_SHAPE_MATCH",
            value,
            reason: "expected `map_snap`, `edge_walk` or `walk_or_snap`".to_string(),
        }),
    }
}

impl ValhallaConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value source, falling back to defaults for unset keys.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("VALHALLA_URL") {
            config.base_url = url.trim().to_string();
        }
        if let Some(costing) = lookup("VALHALLA_COSTING") {
            config.options.costing = costing.trim().to_string();
        }
        if let Some(units) = lookup("VALHALLA_UNITS") {
            config.options.units = parse_units(units)?;
        }
        if let Some(shape_match) = lookup("VALHALLA_SHAPE_MATCH") {
            config.options.shape_match = parse_shape_match(shape_match)?;
        }
        if let Some(size) = lookup("VALHALLA_BATCH_SIZE") {
            config.trace.batch_size = parse::<NonZeroUsize>("VALHALLA_BATCH_SIZE", size)?;
        }
        if let Some(in_flight) = lookup("VALHALLA_MAX_IN_FLIGHT") {
            config.trace.max_in_flight = parse::<NonZeroUsize>("VALHALLA_MAX_IN_FLIGHT", in_flight)?;
        }
        if let Some(secs) = lookup("VALHALLA_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse::<u64>("VALHALLA_TIMEOUT_SECS", secs)?);
        }
        if let Some(rpm) = lookup("VALHALLA_REQUESTS_PER_MINUTE") {
            config.requests_per_minute = Some(parse::<NonZeroU32>("VALHALLA_REQUESTS_PER_MINUTE", rpm)?);
        }

        Ok(config)
    }

    pub fn build_provider(&self) -> Result<ValhallaProvider, TransportError> {
        ValhallaProvider::new(
            self.base_url.clone(),
            self.options.clone(),
            self.timeout,
            self.requests_per_minute.map(per_minute_limiter),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ValhallaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ValhallaConfig::default());
        assert_eq!(config.trace.batch_size.get(), 100);
        assert_eq!(config.trace.max_in_flight.get(), 1);
        assert_eq!(config.options.costing, "auto");
    }

    #[test]
    fn test_reads_overrides() {
        let config = ValhallaConfig::from_lookup(lookup(&[
            ("VALHALLA_URL", "http://192.168.1.190:8002"),
            ("VALHALLA_BATCH_SIZE", "250"),
            ("VALHALLA_MAX_IN_FLIGHT", "4"),
            ("VALHALLA_UNITS", "Kilometers"),
            ("VALHALLA_SHAPE_MATCH", "edge_walk"),
            ("VALHALLA_REQUESTS_PER_MINUTE", "60"),
            ("VALHALLA_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://192.168.1.190:8002");
        assert_eq!(config.trace.batch_size.get(), 250);
        assert_eq!(config.trace.max_in_flight.get(), 4);
        assert_eq!(config.options.units, Units::Kilometers);
        assert_eq!(config.options.shape_match, ShapeMatch::EdgeWalk);
        assert_eq!(config.requests_per_minute, NonZeroU32::new(60));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let err = ValhallaConfig::from_lookup(lookup(&[("VALHALLA_BATCH_SIZE", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "VALHALLA_BATCH_SIZE",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_units() {
        assert!(ValhallaConfig::from_lookup(lookup(&[("VALHALLA_UNITS", "furlongs")])).is_err());
    }
}
