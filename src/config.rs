use std::env;
use std::net::SocketAddr;

use thiserror::Error;

use crate::calendar::DisplayLocale;

const DEFAULT_DATABASE_URL: &str = "sqlite://class_calendar.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub display_locale: DisplayLocale,
}

impl AppConfig {
    /// Reads `DATABASE_URL`, `BIND_ADDR`, `DB_MAX_CONNECTIONS` and
    /// `DISPLAY_LOCALE`, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = parse_or("BIND_ADDR", lookup("BIND_ADDR"), DEFAULT_BIND_ADDR, |raw| {
            raw.parse::<SocketAddr>().map_err(|e| e.to_string())
        })?;

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                Ok(_) => return Err(invalid("DB_MAX_CONNECTIONS", raw, "must be at least 1")),
                Err(e) => return Err(invalid("DB_MAX_CONNECTIONS", raw, e.to_string())),
            },
        };

        let display_locale = match lookup("DISPLAY_LOCALE") {
            None => DisplayLocale::default(),
            Some(raw) => raw
                .parse::<DisplayLocale>()
                .map_err(|reason| invalid("DISPLAY_LOCALE", raw.clone(), reason))?,
        };

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            display_locale,
        })
    }
}

fn parse_or<T, P>(
    key: &'static str,
    value: Option<String>,
    default: &str,
    parse: P,
) -> Result<T, ConfigError>
where
    P: Fn(&str) -> Result<T, String>,
{
    let raw = value.unwrap_or_else(|| default.to_string());
    parse(raw.trim()).map_err(|reason| invalid(key, raw, reason))
}

fn invalid(key: &'static str, value: String, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.display_locale, DisplayLocale::Indonesian);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("DB_MAX_CONNECTIONS", "2"),
            ("DISPLAY_LOCALE", "en"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.display_locale, DisplayLocale::English);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("BIND_ADDR", "localhost")]).is_err());
        assert!(config_from(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(config_from(&[("DB_MAX_CONNECTIONS", "many")]).is_err());
        let err = config_from(&[("DISPLAY_LOCALE", "fr")]).unwrap_err();
        assert!(err.to_string().starts_with("DISPLAY_LOCALE"));
    }
}
