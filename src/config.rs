//! Host settings and agent configuration.
//!
//! Two separate artifacts: [`MonitorSettings`] comes from the host's own
//! settings and only gates whether the lifecycle extension is constructed;
//! [`AgentConfig`] carries collector connection details and is loaded once at
//! process start from a TOML file, with environment overrides applied on top.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::error::{Result, TelemetryError};

/// Host-supplied switch for the lifecycle extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// When false, [`crate::CrawlMonitor::from_settings`] refuses construction
    /// and the host registers no handlers.
    #[serde(default)]
    pub extension_enabled: bool,
}

/// Collector connection details, the agent's configuration-file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// May be omitted in the file when supplied via
    /// `CRAWL_TELEMETRY_LICENSE_KEY`; an empty key is refused either way.
    #[serde(default)]
    pub license_key: String,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_app_name() -> String {
    String::from("crawler")
}

fn default_host() -> String {
    String::from("http://127.0.0.1:8126")
}

fn default_timeout_secs() -> u64 {
    5
}

impl AgentConfig {
    /// Reads the TOML configuration file, then applies `CRAWL_TELEMETRY_*`
    /// environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: AgentConfig = toml::from_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from environment variables alone, honoring a
    /// `.env` file if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = AgentConfig {
            license_key: String::new(),
            app_name: default_app_name(),
            host: default_host(),
            timeout_secs: default_timeout_secs(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CRAWL_TELEMETRY_LICENSE_KEY") {
            self.license_key = v;
        }
        if let Ok(v) = std::env::var("CRAWL_TELEMETRY_APP_NAME") {
            self.app_name = v;
        }
        if let Ok(v) = std::env::var("CRAWL_TELEMETRY_HOST") {
            self.host = v;
        }
        if let Ok(v) = std::env::var("CRAWL_TELEMETRY_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.timeout_secs = n,
                Err(_) => warn!(value = %v, "ignoring unparsable CRAWL_TELEMETRY_TIMEOUT_SECS"),
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.license_key.is_empty() {
            return Err(TelemetryError::Config(
                "license_key must not be empty".into(),
            ));
        }
        Ok(())
    }
}
