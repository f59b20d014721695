use std::path::PathBuf;
use std::time::Duration;

use relay_engine::PosterSettings;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// | Env Var                      | Default                            |
/// |------------------------------|------------------------------------|
/// | `RELAY_HOST`                 | `0.0.0.0`                          |
/// | `RELAY_PORT`                 | `3000`                             |
/// | `RELAY_API_BASE`             | `https://graph.facebook.com/v19.0` |
/// | `RELAY_CONNECT_TIMEOUT_SECS` | `10`                               |
/// | `RELAY_REQUEST_TIMEOUT_SECS` | `30`                               |
/// | `RELAY_USERS_FILE`           | `./data/users.json`                |
/// | `RELAY_ADMIN_KEY`            | unset, admin routes disabled       |
/// | `RELAY_LOG_FILE`             | unset, terminal only               |
/// | `RELAY_FEED_CAPACITY`        | `1024`                             |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub poster: PosterSettings,
    pub users_file: PathBuf,
    pub admin_key: Option<String>,
    pub log_file: Option<PathBuf>,
    pub feed_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = PosterSettings::default();

        let connect_secs = parse_or(&get, "RELAY_CONNECT_TIMEOUT_SECS", 10u64, "u64")?;
        let request_secs = parse_or(&get, "RELAY_REQUEST_TIMEOUT_SECS", 30u64, "u64")?;

        Ok(Self {
            host: get("RELAY_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "RELAY_PORT", 3000u16, "u16")?,
            poster: PosterSettings {
                api_base: get("RELAY_API_BASE").unwrap_or(defaults.api_base),
                connect_timeout: Duration::from_secs(connect_secs),
                request_timeout: Duration::from_secs(request_secs),
            },
            users_file: get("RELAY_USERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/users.json")),
            admin_key: get("RELAY_ADMIN_KEY"),
            log_file: get("RELAY_LOG_FILE").map(PathBuf::from),
            feed_capacity: parse_or(&get, "RELAY_FEED_CAPACITY", 1024usize, "usize")?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.poster, PosterSettings::default());
        assert_eq!(config.users_file, PathBuf::from("./data/users.json"));
        assert_eq!(config.admin_key, None);
        assert_eq!(config.feed_capacity, 1024);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("RELAY_PORT", "8080"),
            ("RELAY_API_BASE", "http://localhost:9999/v1"),
            ("RELAY_REQUEST_TIMEOUT_SECS", " 5 "),
            ("RELAY_ADMIN_KEY", "secret"),
            ("RELAY_LOG_FILE", ""),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.poster.api_base, "http://localhost:9999/v1");
        assert_eq!(config.poster.request_timeout, Duration::from_secs(5));
        assert_eq!(config.admin_key.as_deref(), Some("secret"));
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn malformed_numbers_are_errors() {
        let err = AppConfig::from_lookup(lookup(&[("RELAY_PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "RELAY_PORT",
                expected: "u16",
                value: "eighty".to_string(),
            }
        );
    }
}
