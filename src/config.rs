//! Runtime configuration.
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional JSON
//! config file, command-line flags.
//!
//! Example `meshdash.json`:
//! ```json
//! {
//!   "backend_url": "http://relay.local:5643",
//!   "message_interval_ms": 1000,
//!   "node_interval_ms": 10000,
//!   "request_timeout_ms": 5000,
//!   "log_level": "info"
//! }
//! ```

use crate::Result;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5643";
pub const DEFAULT_MESSAGE_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_NODE_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Config file format. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub backend_url: Option<String>,
    pub message_interval_ms: Option<u64>,
    pub node_interval_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parse config file {}", path.display()))
    }
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub message_interval_ms: Option<u64>,
    pub node_interval_ms: Option<u64>,
    pub log_level: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub backend_url: String,
    pub message_interval: Duration,
    pub node_interval: Duration,
    pub request_timeout: Duration,
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            message_interval: Duration::from_millis(DEFAULT_MESSAGE_INTERVAL_MS),
            node_interval: Duration::from_millis(DEFAULT_NODE_INTERVAL_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Merge file values and command-line overrides over the defaults, then
    /// validate.
    pub fn resolve(file: Option<ConfigFile>, cli: Overrides) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let ms = |given: Option<u64>, from_file: Option<u64>, fallback: Duration| {
            given.or(from_file).map_or(fallback, Duration::from_millis)
        };

        let config = Self {
            backend_url: cli
                .backend_url
                .or(file.backend_url)
                .unwrap_or(defaults.backend_url)
                .trim_end_matches('/')
                .to_string(),
            message_interval: ms(
                cli.message_interval_ms,
                file.message_interval_ms,
                defaults.message_interval,
            ),
            node_interval: ms(cli.node_interval_ms, file.node_interval_ms, defaults.node_interval),
            request_timeout: ms(None, file.request_timeout_ms, defaults.request_timeout),
            log_level: cli.log_level.or(file.log_level).unwrap_or(defaults.log_level),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.backend_url.is_empty() {
            bail!("backend_url must not be empty");
        }
        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://") {
            bail!("backend_url must be an http(s) URL: {}", self.backend_url);
        }
        for (name, value) in [
            ("message_interval_ms", self.message_interval),
            ("node_interval_ms", self.node_interval),
            ("request_timeout_ms", self.request_timeout),
        ] {
            if value.is_zero() {
                bail!("{name} must be greater than zero");
            }
        }
        Ok(())
    }
}
