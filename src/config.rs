use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Service configuration, read from the environment (and `.env`).
///
/// | Env Var                     | Default                  |
/// |-----------------------------|--------------------------|
/// | `DATABASE_URL`              | `sqlite://shootdesk.db`  |
/// | `DATABASE_MAX_CONNECTIONS`  | `5`                      |
/// | `HOST`                      | `0.0.0.0`                |
/// | `PORT`                      | `3000`                   |
/// | `FIXTURES_PATH`             | `fixtures/schedule.json` |
/// | `STRICT_STATUS_TRANSITIONS` | `false`                  |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub fixtures_path: PathBuf,
    /// Reject status changes that skip or rewind a lifecycle stage.
    pub strict_status_transitions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://shootdesk.db".to_string(),
            max_connections: 5,
            host: "0.0.0.0".to_string(),
            port: 3000,
            fixtures_path: PathBuf::from("fixtures/schedule.json"),
            strict_status_transitions: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            fixtures_path: lookup("FIXTURES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.fixtures_path),
            strict_status_transitions: parse_or(
                &lookup,
                "STRICT_STATUS_TRANSITIONS",
                defaults.strict_status_transitions,
            )?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.database_url, "sqlite://shootdesk.db");
        assert!(!config.strict_status_transitions);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config(&[
            ("PORT", "8080"),
            ("STRICT_STATUS_TRANSITIONS", "true"),
            ("FIXTURES_PATH", "/srv/schedule.json"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.strict_status_transitions);
        assert_eq!(config.fixtures_path, PathBuf::from("/srv/schedule.json"));
    }

    #[test]
    fn bad_numbers_are_errors() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.var, "PORT");
        assert_eq!(err.value, "eighty");
    }
}
