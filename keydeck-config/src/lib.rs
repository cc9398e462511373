//! Configuration management for Keydeck services

use serde::Deserialize;
use std::collections::HashMap;
use std::env;

/// Which implementation backs the `api_keys` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyStoreBackendKind {
    /// Hosted PostgREST-style endpoint
    #[default]
    Rest,
    /// Direct Postgres connection
    Postgres,
    /// In-process table, lost on restart
    Memory,
}

impl KeyStoreBackendKind {
    fn parse(value: &str) -> Result<Self, config::ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(config::ConfigError::Message(format!(
                "Unknown KEY_STORE_BACKEND: {}",
                other
            ))),
        }
    }
}

/// Key store configuration
///
/// `url` and `anon_key` are not checked here: a missing value surfaces as a
/// failing store call, not a startup error.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyStoreConfig {
    pub backend: KeyStoreBackendKind,
    pub url: String,
    pub anon_key: String,
    pub database_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// HTTP server and gate configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub protected_prefix: String,
    pub entry_path: String,
    pub key_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            protected_prefix: "/protected".to_string(),
            entry_path: "/playground".to_string(),
            key_prefix: "tvly".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub key_store: KeyStoreConfig,
    pub server: ServerConfig,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_vars(&env::vars().collect())
    }

    /// Build configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, config::ConfigError> {
        let var = |name: &str| vars.get(name).cloned();
        let defaults = ServerConfig::default();

        let backend = match var("KEY_STORE_BACKEND") {
            Some(value) => KeyStoreBackendKind::parse(&value)?,
            None => KeyStoreBackendKind::default(),
        };

        let timeout_seconds = match var("KEY_STORE_TIMEOUT_SECS") {
            Some(value) => Some(value.parse::<u64>().map_err(|e| {
                config::ConfigError::Message(format!("Invalid KEY_STORE_TIMEOUT_SECS: {}", e))
            })?),
            None => None,
        };

        let port = match var("SERVER_PORT") {
            Some(value) => value.parse::<u16>().map_err(|e| {
                config::ConfigError::Message(format!("Invalid SERVER_PORT: {}", e))
            })?,
            None => defaults.port,
        };

        Ok(Self {
            key_store: KeyStoreConfig {
                backend,
                url: var("KEY_STORE_URL").unwrap_or_default(),
                anon_key: var("KEY_STORE_ANON_KEY").unwrap_or_default(),
                database_url: var("DATABASE_URL"),
                timeout_seconds,
            },
            server: ServerConfig {
                port,
                protected_prefix: normalize_path(
                    var("PROTECTED_PREFIX").unwrap_or(defaults.protected_prefix),
                ),
                entry_path: normalize_path(var("ENTRY_PATH").unwrap_or(defaults.entry_path)),
                key_prefix: var("API_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            },
            log_level: Some(var("LOG_LEVEL").unwrap_or_else(|| "info".to_string())),
            log_format: var("LOG_FORMAT"),
        })
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Whether logs should be emitted as JSON
    pub fn json_logs(&self) -> bool {
        matches!(self.log_format.as_deref(), Some("json"))
    }
}

/// Paths always start with a slash and never end with one
fn normalize_path(path: String) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::from_vars(&HashMap::new()).unwrap();

        assert_eq!(config.key_store.backend, KeyStoreBackendKind::Rest);
        assert!(config.key_store.url.is_empty());
        assert!(config.key_store.anon_key.is_empty());
        assert_eq!(config.key_store.timeout_seconds, None);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.protected_prefix, "/protected");
        assert_eq!(config.server.entry_path, "/playground");
        assert_eq!(config.server.key_prefix, "tvly");
        assert_eq!(config.log_level(), "info");
        assert!(!config.json_logs());
    }

    #[test]
    fn test_config_from_vars() {
        let config = AppConfig::from_vars(&vars(&[
            ("KEY_STORE_URL", "https://example.supabase.co"),
            ("KEY_STORE_ANON_KEY", "anon"),
            ("KEY_STORE_BACKEND", "memory"),
            ("SERVER_PORT", "8080"),
            ("PROTECTED_PREFIX", "members/"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.key_store.url, "https://example.supabase.co");
        assert_eq!(config.key_store.backend, KeyStoreBackendKind::Memory);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.protected_prefix, "/members");
        assert!(config.json_logs());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::from_vars(&vars(&[("SERVER_PORT", "http")])).is_err());
        assert!(AppConfig::from_vars(&vars(&[("KEY_STORE_BACKEND", "sqlite")])).is_err());
        assert!(AppConfig::from_vars(&vars(&[("KEY_STORE_TIMEOUT_SECS", "-1")])).is_err());
    }
}
