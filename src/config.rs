//! Configuration types for the sync service
//!
//! This module contains the configuration structures loaded from YAML.
//! Every section is optional in the file and falls back to its defaults;
//! credentials are usually supplied through CLI flags or the environment.

use crate::error::{Error, Result, ResultExt};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upstream API settings
    pub api: ApiSettings,
    /// Local store settings
    pub store: StoreSettings,
    /// Sync loop settings
    pub sync: SyncSettings,
    /// Read-side HTTP server settings
    pub server: ServerSettings,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Check that everything a sync run needs is present
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        if self.sync.max_attempts == 0 {
            return Err(Error::config("sync.max_attempts must be at least 1"));
        }
        if self.sync.max_pages == 0 {
            return Err(Error::config("sync.max_pages must be at least 1"));
        }
        if self.sync.interval_minutes == 0 {
            return Err(Error::config("sync.interval_minutes must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// API Settings
// ============================================================================

/// Upstream API settings as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL, e.g. `https://apigw3.example.com/productinformation`
    pub base_url: String,
    /// Literal `Authorization` header value
    pub authorization: Option<String>,
    /// Basic auth username (used when `authorization` is not set)
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
    /// Value of the `Client_Id` header
    pub client_id: String,
    /// Customer number sent with every request
    pub customer: String,
    /// Page size
    pub limit: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            authorization: None,
            username: None,
            password: None,
            client_id: String::new(),
            customer: String::new(),
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_limit() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    120
}

impl ApiSettings {
    /// Resolve the `Authorization` header value
    pub fn authorization_header(&self) -> Option<String> {
        if let Some(auth) = self.authorization.as_deref().filter(|a| !a.is_empty()) {
            return Some(auth.to_string());
        }
        let username = self.username.as_deref()?;
        let password = self.password.as_deref().unwrap_or_default();
        let credentials = format!("{username}:{password}");
        Some(format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::missing_field("api.base_url"));
        }
        url::Url::parse(&self.base_url)?;
        if self.client_id.is_empty() {
            return Err(Error::missing_field("api.client_id"));
        }
        if self.customer.is_empty() {
            return Err(Error::missing_field("api.customer"));
        }
        if self.authorization_header().is_none() {
            return Err(Error::missing_field("api.authorization"));
        }
        if self.limit == 0 {
            return Err(Error::config("api.limit must be at least 1"));
        }
        Ok(())
    }

    /// Build the immutable per-run API config
    pub fn to_api_config(&self) -> Result<ApiConfig> {
        self.validate()?;
        Ok(ApiConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            authorization: self.authorization_header().unwrap_or_default(),
            client_id: self.client_id.clone(),
            customer: self.customer.clone(),
            limit: self.limit,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Resolved, immutable settings for talking to the upstream API.
///
/// Built once per run and shared by every page fetch.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    /// `Authorization` header value
    pub authorization: String,
    /// `Client_Id` header value
    pub client_id: String,
    /// Customer number
    pub customer: String,
    /// Page size
    pub limit: u32,
    /// Request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Create a config with the default page size and timeout
    pub fn new(
        base_url: impl Into<String>,
        authorization: impl Into<String>,
        client_id: impl Into<String>,
        customer: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: authorization.into(),
            client_id: client_id.into(),
            customer: customer.into(),
            limit: default_limit(),
            timeout: Duration::from_secs(default_timeout_secs()),
        }
    }

    /// Set the page size
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("authorization", &"****")
            .field("client_id", &self.client_id)
            .field("customer", &self.customer)
            .field("limit", &self.limit)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// Store Settings
// ============================================================================

/// Local store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path of the DuckDB file
    pub path: PathBuf,
    /// How long to wait for the store file lock, in milliseconds
    pub acquire_timeout_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catalog.duckdb"),
            acquire_timeout_ms: 3000,
        }
    }
}

impl StoreSettings {
    /// Lock acquisition timeout
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

// ============================================================================
// Sync Settings
// ============================================================================

/// Sync loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Minutes between scheduled cycles
    pub interval_minutes: u64,
    /// Attempts per page before the sync gives up
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each further attempt
    pub backoff_base_ms: u64,
    /// Pause between consecutive pages
    pub page_delay_ms: u64,
    /// Upper bound on pages per kind
    pub max_pages: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval_minutes: 15,
            max_attempts: 3,
            backoff_base_ms: 1000,
            page_delay_ms: 100,
            max_pages: 10_000,
        }
    }
}

impl SyncSettings {
    /// Interval between scheduled cycles
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

// ============================================================================
// Server Settings
// ============================================================================

/// Read-side HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_yaml() -> &'static str {
        r"
api:
  base_url: https://api.example.com/productinformation/
  authorization: Basic abc123
  client_id: client-1
  customer: '3423300'
store:
  path: /tmp/catalog.duckdb
sync:
  interval_minutes: 360
"
    }

    #[test]
    fn test_parse_config_with_defaults() {
        let config = AppConfig::from_yaml(valid_yaml()).unwrap();

        assert_eq!(config.api.client_id, "client-1");
        assert_eq!(config.api.customer, "3423300");
        assert_eq!(config.api.limit, 1000);
        assert_eq!(config.api.timeout_secs, 120);
        assert_eq!(config.store.path, PathBuf::from("/tmp/catalog.duckdb"));
        assert_eq!(config.store.acquire_timeout(), Duration::from_secs(3));
        assert_eq!(config.sync.interval(), Duration::from_secs(360 * 60));
        assert_eq!(config.sync.max_attempts, 3);
        assert_eq!(config.sync.page_delay_ms, 100);
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config.sync.interval_minutes, 15);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_config_trims_base_url() {
        let config = AppConfig::from_yaml(valid_yaml()).unwrap();
        let api = config.api.to_api_config().unwrap();
        assert_eq!(api.base_url, "https://api.example.com/productinformation");
        assert_eq!(api.authorization, "Basic abc123");
        assert_eq!(api.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_basic_auth_from_username_password() {
        let settings = ApiSettings {
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..ApiSettings::default()
        };
        assert_eq!(
            settings.authorization_header(),
            Some("Basic dXNlcjpwYXNz".to_string())
        );
    }

    #[test]
    fn test_explicit_authorization_wins() {
        let settings = ApiSettings {
            authorization: Some("Bearer token".to_string()),
            username: Some("user".to_string()),
            ..ApiSettings::default()
        };
        assert_eq!(
            settings.authorization_header(),
            Some("Bearer token".to_string())
        );
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut config = AppConfig::from_yaml(valid_yaml()).unwrap();
        config.api.client_id.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.client_id"));

        let mut config = AppConfig::from_yaml(valid_yaml()).unwrap();
        config.api.authorization = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.authorization"));
    }

    #[test]
    fn test_validate_bad_url() {
        let mut config = AppConfig::from_yaml(valid_yaml()).unwrap();
        config.api.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, valid_yaml()).unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.api.customer, "3423300");

        let err = AppConfig::from_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_validate_zero_attempts() {
        let mut config = AppConfig::from_yaml(valid_yaml()).unwrap();
        config.sync.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_config_debug_masks_authorization() {
        let api = ApiConfig::new("https://x", "Basic secret", "c", "1");
        let debug = format!("{api:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("****"));
    }
}
