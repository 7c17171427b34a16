//! Environment-driven configuration.

use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::value_objects::{Money, Weight, DEFAULT_CURRENCY};
use crate::search::{DEFAULT_PAGE_SIZE, DEFAULT_SUGGESTION_LIMIT, SUGGESTION_DEBOUNCE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceKind {
    /// In-memory sample catalog.
    Fixture,
    /// The hosted backend's Postgres tables.
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateBackend {
    Memory,
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_source: DataSourceKind,
    pub nats_url: Option<String>,
    pub state: StateBackend,
    pub free_shipping_threshold: Money,
    pub shipping_origin: String,
    pub default_unit_weight: Weight,
    pub suggestion_limit: usize,
    /// Quiet period before a session's suggestion request is answered.
    pub suggestion_debounce: Duration,
    pub search_page_size: u32,
    /// User ids granted the admin role by the fixture catalog.
    pub fixture_admins: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("{0} must be set when DATA_SOURCE=postgres")]
    Missing(&'static str),
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

impl Config {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_source = match lookup("DATA_SOURCE").as_deref().map(str::trim) {
            None | Some("") | Some("fixture") | Some("mock") => DataSourceKind::Fixture,
            Some("postgres") | Some("live") => DataSourceKind::Postgres {
                database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            Some(other) => return Err(ConfigError::Invalid { key: "DATA_SOURCE", value: other.to_string() }),
        };
        let state = match lookup("STATE_DIR") {
            None => StateBackend::Memory,
            Some(dir) if dir.trim().is_empty() || dir.trim() == "memory" => StateBackend::Memory,
            Some(dir) => StateBackend::Directory(PathBuf::from(dir.trim())),
        };
        let threshold: Decimal = parse(&lookup, "FREE_SHIPPING_THRESHOLD", Decimal::from(500_000))?;
        let page_size: u32 = parse(&lookup, "SEARCH_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::Invalid { key: "SEARCH_PAGE_SIZE", value: "0".into() });
        }

        Ok(Self {
            port: parse(&lookup, "PORT", 8080)?,
            data_source,
            nats_url: lookup("NATS_URL").filter(|u| !u.trim().is_empty()),
            state,
            free_shipping_threshold: Money::new(threshold, DEFAULT_CURRENCY),
            shipping_origin: lookup("SHIPPING_ORIGIN").unwrap_or_else(|| "Hồ Chí Minh".to_string()),
            default_unit_weight: Weight::grams(parse(&lookup, "DEFAULT_UNIT_WEIGHT_GRAMS", 500)?),
            suggestion_limit: parse(&lookup, "SUGGESTION_LIMIT", DEFAULT_SUGGESTION_LIMIT)?,
            suggestion_debounce: Duration::from_millis(parse(&lookup, "SUGGESTION_DEBOUNCE_MS", SUGGESTION_DEBOUNCE.as_millis() as u64)?),
            search_page_size: page_size,
            fixture_admins: lookup("FIXTURE_ADMIN_IDS")
                .map(|ids| ids.split(',').map(|id| id.trim().to_string()).filter(|id| !id.is_empty()).collect())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let c = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(c.port, 8080);
        assert_eq!(c.data_source, DataSourceKind::Fixture);
        assert_eq!(c.state, StateBackend::Memory);
        assert_eq!(c.free_shipping_threshold, Money::vnd(500_000));
        assert_eq!(c.default_unit_weight, Weight::grams(500));
        assert_eq!(c.suggestion_limit, 5);
        assert_eq!(c.search_page_size, 12);
        assert_eq!(c.suggestion_debounce, Duration::from_millis(300));
        assert!(c.fixture_admins.is_empty());
    }

    #[test]
    fn test_fixture_admins_and_debounce() {
        let c = Config::from_lookup(lookup(&[("FIXTURE_ADMIN_IDS", " a1, ,ops-2"), ("SUGGESTION_DEBOUNCE_MS", "0")])).unwrap();
        assert_eq!(c.fixture_admins, vec!["a1".to_string(), "ops-2".to_string()]);
        assert_eq!(c.suggestion_debounce, Duration::ZERO);
    }

    #[test]
    fn test_postgres_requires_url() {
        let err = Config::from_lookup(lookup(&[("DATA_SOURCE", "postgres")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
        let c = Config::from_lookup(lookup(&[("DATA_SOURCE", "postgres"), ("DATABASE_URL", "postgres://x")])).unwrap();
        assert_eq!(c.data_source, DataSourceKind::Postgres { database_url: "postgres://x".into() });
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(Config::from_lookup(lookup(&[("PORT", "eighty")])), Err(ConfigError::Invalid { key: "PORT", .. })));
        assert!(matches!(Config::from_lookup(lookup(&[("DATA_SOURCE", "mongo")])), Err(ConfigError::Invalid { key: "DATA_SOURCE", .. })));
        assert!(Config::from_lookup(lookup(&[("SEARCH_PAGE_SIZE", "0")])).is_err());
    }

    #[test]
    fn test_state_dir() {
        let c = Config::from_lookup(lookup(&[("STATE_DIR", "/tmp/vnshop")])).unwrap();
        assert_eq!(c.state, StateBackend::Directory(PathBuf::from("/tmp/vnshop")));
    }
}
