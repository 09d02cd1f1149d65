use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Attempts;
use crate::error::GtopError;
use crate::gtop::{GTOP_BASE_URL, GtopClient};
use crate::rcsb::{RCSB_BASE_URL, RcsbSearchClient};
use crate::repository::GtopRepository;
use crate::resolver::PdbResolver;
use crate::retry::RetryPolicy;
use crate::transport::HttpTransport;

pub const DEFAULT_CONFIG_FILE: &str = "gtop-xref.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 200;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub gtop_base_url: Option<String>,
    #[serde(default)]
    pub rcsb_base_url: Option<String>,
    #[serde(default)]
    pub attempts: Option<Value>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub gtop_base_url: String,
    pub rcsb_base_url: String,
    pub attempts: Attempts,
    pub timeout: Duration,
    pub retry_delay: Duration,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            gtop_base_url: GTOP_BASE_URL.to_string(),
            rcsb_base_url: RCSB_BASE_URL.to_string(),
            attempts: Attempts::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl ResolvedConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts, self.retry_delay)
    }

    /// Wires the HTTP transport, both service clients and the resolver.
    pub fn build_resolver(
        &self,
    ) -> Result<PdbResolver<HttpTransport, RcsbSearchClient<HttpTransport>>, GtopError> {
        let retry = self.retry_policy();
        let gtop = GtopClient::new(
            HttpTransport::new(self.timeout)?,
            &self.gtop_base_url,
            retry,
        )?;
        let rcsb = RcsbSearchClient::new(
            HttpTransport::new(self.timeout)?,
            &self.rcsb_base_url,
            retry,
        )?;
        Ok(PdbResolver::new(GtopRepository::new(gtop), rcsb))
    }
}

/// Non-integers are a usage error, not a parse error.
fn attempts_from(value: &Value) -> Result<Attempts, GtopError> {
    match value.as_i64() {
        Some(count) => Attempts::new(count),
        None => Err(GtopError::InvalidAttempts(value.to_string())),
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, GtopError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| GtopError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| GtopError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, GtopError> {
        let defaults = ResolvedConfig::default();

        let attempts = match config.attempts {
            Some(value) => attempts_from(&value)?,
            None => defaults.attempts,
        };

        Ok(ResolvedConfig {
            gtop_base_url: config.gtop_base_url.unwrap_or(defaults.gtop_base_url),
            rcsb_base_url: config.rcsb_base_url.unwrap_or(defaults.rcsb_base_url),
            attempts,
            timeout: config
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            retry_delay: config
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
        })
    }
}
