//! Client configuration loaded from environment variables.
//!
//! A single `ClientConfig` feeds the gateway, the session store and every
//! resource client, so there is exactly one place that decides the base URL
//! and the storage key the bearer token lives under.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Storage key for the bearer token unless overridden.
pub const DEFAULT_TOKEN_KEY: &str = "authToken";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API base URL, without trailing slash (e.g. `http://localhost:8080/api`)
    pub api_base_url: String,
    /// Origin of the application itself; OAuth messages from elsewhere are dropped
    pub app_origin: String,
    /// Server URL that hosts the `/oauth2/authorization/{provider}` endpoints
    pub oauth_base_url: String,
    /// Where the host should navigate on forced logout
    pub login_path: String,
    /// Storage key for the bearer token
    pub token_key: String,
    /// Path fragments marking endpoints that may fail auth without forcing logout
    pub public_path_markers: Vec<String>,
    /// `Location` fragments identifying third-party identity providers
    pub identity_provider_hosts: Vec<String>,
    /// Serve in-memory fallback data when live calls fail
    pub fallback_enabled: bool,
    /// Credential file for the durable store (None = platform default)
    pub store_path: Option<PathBuf>,
    /// Per-request timeout (None = transport default)
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            app_origin: "http://localhost:5173".to_string(),
            oauth_base_url: "http://localhost:8080".to_string(),
            login_path: "/login".to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            public_path_markers: vec!["/public/".to_string()],
            identity_provider_hosts: vec![
                "accounts.google.com".to_string(),
                "github.com/login".to_string(),
            ],
            fallback_enabled: true,
            store_path: None,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Default config for tests, pointed at a local test backend.
    pub fn test_default(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            oauth_base_url: api_base_url.trim_end_matches('/').to_string(),
            request_timeout: Some(Duration::from_secs(5)),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("SKILLSHARE_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);
        validate_url("SKILLSHARE_API_URL", &api_base_url)?;

        let app_origin = lookup("SKILLSHARE_APP_ORIGIN")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.app_origin);
        validate_url("SKILLSHARE_APP_ORIGIN", &app_origin)?;

        let oauth_base_url = lookup("SKILLSHARE_OAUTH_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.oauth_base_url);
        validate_url("SKILLSHARE_OAUTH_URL", &oauth_base_url)?;

        let fallback_enabled = match lookup("SKILLSHARE_FALLBACK") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid {
                name: "SKILLSHARE_FALLBACK",
                reason: format!("expected true/false, got {:?}", v),
            })?,
            None => defaults.fallback_enabled,
        };

        let request_timeout = match lookup("SKILLSHARE_TIMEOUT_SECS") {
            Some(v) => {
                let secs: u64 = v.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: "SKILLSHARE_TIMEOUT_SECS",
                    reason: format!("expected seconds, got {:?}", v),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_base_url,
            app_origin,
            oauth_base_url,
            token_key: lookup("SKILLSHARE_TOKEN_KEY")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.token_key),
            fallback_enabled,
            store_path: lookup("SKILLSHARE_STORE_PATH").map(PathBuf::from),
            request_timeout,
            ..defaults
        })
    }

    /// Whether a request path targets a public endpoint.
    pub fn is_public_path(&self, path: &str) -> bool {
        self.public_path_markers.iter().any(|m| path.contains(m))
    }

    /// Whether a redirect `Location` points at a third-party identity provider.
    ///
    /// Entries are `host` or `host/path-prefix`; relative locations never match.
    pub fn is_identity_provider(&self, location: &str) -> bool {
        let Ok(url) = reqwest::Url::parse(location) else {
            return false;
        };
        let Some(host) = url.host_str() else {
            return false;
        };

        self.identity_provider_hosts.iter().any(|entry| {
            let (entry_host, prefix) = match entry.find('/') {
                Some(i) => entry.split_at(i),
                None => (entry.as_str(), ""),
            };
            host.eq_ignore_ascii_case(entry_host) && url.path().starts_with(prefix)
        })
    }
}

fn validate_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    reqwest::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid {
            name,
            reason: format!("{}: {}", value, e),
        })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
