//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RECONCILE_*` environment variables.

use std::env;
use std::time::Duration;

use crate::error::{ReconcileError, Result};
use crate::providers::aat::{DEFAULT_ENDPOINT, VIEW_URL_TEMPLATE};

/// Service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Address to bind to. Default: `0.0.0.0`.
    pub host: String,

    /// HTTP server port. Default: `5000`.
    pub port: u16,

    /// SQLite response cache file. Default: `getty_cache.db`.
    pub cache_path: String,

    /// Cached responses older than this are refetched. `None` never expires.
    pub cache_ttl: Option<Duration>,

    /// AAT term-matching endpoint.
    pub aat_endpoint: String,

    /// Upstream request timeout. Default: 10s.
    pub http_timeout: Duration,

    /// Name reported in the service metadata.
    pub service_name: String,

    /// View link template reported in the service metadata.
    pub view_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cache_path: "getty_cache.db".to_string(),
            cache_ttl: Some(Duration::from_secs(86_400)),
            aat_endpoint: DEFAULT_ENDPOINT.to_string(),
            http_timeout: Duration::from_secs(10),
            service_name: "Getty Reconciliation Service".to_string(),
            view_url: VIEW_URL_TEMPLATE.to_string(),
        }
    }
}

impl Config {
    const ENV_HOST: &'static str = "RECONCILE_HOST";
    const ENV_PORT: &'static str = "RECONCILE_PORT";
    const ENV_CACHE_PATH: &'static str = "RECONCILE_CACHE_PATH";
    const ENV_CACHE_TTL: &'static str = "RECONCILE_CACHE_TTL_SECS";
    const ENV_AAT_ENDPOINT: &'static str = "RECONCILE_AAT_ENDPOINT";
    const ENV_HTTP_TIMEOUT: &'static str = "RECONCILE_HTTP_TIMEOUT_SECS";
    const ENV_SERVICE_NAME: &'static str = "RECONCILE_SERVICE_NAME";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup(Self::ENV_PORT) {
            Some(raw) => parse_number::<u16>(Self::ENV_PORT, &raw)?,
            None => defaults.port,
        };

        let cache_ttl = match lookup(Self::ENV_CACHE_TTL) {
            Some(raw) => match parse_number::<u64>(Self::ENV_CACHE_TTL, &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => defaults.cache_ttl,
        };

        let http_timeout = match lookup(Self::ENV_HTTP_TIMEOUT) {
            Some(raw) => match parse_number::<u64>(Self::ENV_HTTP_TIMEOUT, &raw)? {
                0 => {
                    return Err(ReconcileError::Config(format!(
                        "{} must be greater than zero",
                        Self::ENV_HTTP_TIMEOUT
                    )))
                }
                secs => Duration::from_secs(secs),
            },
            None => defaults.http_timeout,
        };

        Ok(Self {
            host: lookup(Self::ENV_HOST).unwrap_or(defaults.host),
            port,
            cache_path: lookup(Self::ENV_CACHE_PATH).unwrap_or(defaults.cache_path),
            cache_ttl,
            aat_endpoint: lookup(Self::ENV_AAT_ENDPOINT).unwrap_or(defaults.aat_endpoint),
            http_timeout,
            service_name: lookup(Self::ENV_SERVICE_NAME).unwrap_or(defaults.service_name),
            view_url: defaults.view_url,
        })
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// TTL in the form the cache expects
    pub fn cache_ttl_chrono(&self) -> Option<chrono::Duration> {
        self.cache_ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ReconcileError::Config(format!("{} is not a valid number: '{}'", name, raw)))
}
