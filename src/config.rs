//! Configuration management for the equipment status server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// When set, logs are also written to a daily-rolling file in this directory
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Cosmos DB connection settings.
///
/// Missing `endpoint` or `key` is a valid state: the document store then
/// stays disconnected and every read is served from the sample catalog.
#[derive(Debug, Deserialize, Clone)]
pub struct CosmosConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_container")]
    pub container: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    /// JSON file replacing the built-in sample catalog
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cosmos: CosmosConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(environment())
    }

    fn load_with(environment: Environment) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix EQUIPMENT_STATUS_)
            .add_source(environment)
            .set_override_option("cosmos.endpoint", env::var("COSMOS_DB_ENDPOINT").ok())?
            .set_override_option("cosmos.key", env::var("COSMOS_DB_KEY").ok())?
            .set_override_option("cosmos.database", env::var("COSMOS_DB_DATABASE").ok())?
            .set_override_option("cosmos.container", env::var("COSMOS_DB_CONTAINER").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl CosmosConfig {
    /// Endpoint and key, if both are present and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let endpoint = self.endpoint.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let key = self.key.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((endpoint, key))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `EQUIPMENT_STATUS_<SECTION>__<KEY>`, e.g. `EQUIPMENT_STATUS_COSMOS__REQUEST_TIMEOUT_SECS`
fn environment() -> Environment {
    Environment::with_prefix("EQUIPMENT_STATUS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn default_database() -> String {
    "FactoryIoTData".to_string()
}

fn default_container() -> String {
    "Equipment".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

impl Default for CosmosConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            key: None,
            database: default_database(),
            container: default_container(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            cosmos: CosmosConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_endpoint_and_key() {
        let mut cosmos = CosmosConfig::default();
        assert!(cosmos.credentials().is_none());

        cosmos.endpoint = Some("https://factory.documents.azure.com:443/".to_string());
        assert!(cosmos.credentials().is_none());

        cosmos.key = Some("   ".to_string());
        assert!(cosmos.credentials().is_none());

        cosmos.key = Some("c2VjcmV0".to_string());
        assert_eq!(
            cosmos.credentials(),
            Some(("https://factory.documents.azure.com:443/", "c2VjcmV0"))
        );
    }

    #[test]
    fn test_environment_sets_multi_word_keys() {
        let variables = [
            ("EQUIPMENT_STATUS_COSMOS__REQUEST_TIMEOUT_SECS", "45"),
            ("EQUIPMENT_STATUS_SERVER__PORT", "9090"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = AppConfig::load_with(environment().source(Some(variables))).unwrap();
        assert_eq!(config.cosmos.request_timeout_secs, 45);
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_cosmos_defaults() {
        let cosmos = CosmosConfig::default();
        assert_eq!(cosmos.database, "FactoryIoTData");
        assert_eq!(cosmos.container, "Equipment");
        assert_eq!(cosmos.request_timeout(), Duration::from_secs(30));
    }
}
