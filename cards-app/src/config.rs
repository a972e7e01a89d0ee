//! Configuration loading from environment.

use std::env;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Path segment for the REST routes, `/api/{api_version}`
    pub api_version: String,
    /// Export traces over OTLP when set
    pub otel_enabled: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let api_version = lookup("API_VERSION")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| cards_hex::inbound::DEFAULT_API_VERSION.to_string());

        let otel_enabled = match lookup("OTEL_ENABLED") {
            Some(raw) => raw
                .parse::<bool>()
                .map_err(|_| anyhow::anyhow!("OTEL_ENABLED must be true or false, got {raw}"))?,
            None => false,
        };

        Ok(Self {
            port,
            database_url,
            api_version,
            otel_enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.api_version, "v1");
        assert!(!config.otel_enabled);
    }

    #[test]
    fn test_database_url_required() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "8080"),
            ("API_VERSION", "v2"),
            ("OTEL_ENABLED", "true"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_version, "v2");
        assert!(config.otel_enabled);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(load(&[("DATABASE_URL", "x"), ("PORT", "http")]).is_err());
        assert!(load(&[("DATABASE_URL", "x"), ("OTEL_ENABLED", "yes")]).is_err());
    }
}
