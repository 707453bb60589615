//! Host settings, read from the `[host]` table of the layered configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context;
use datasource_core::config::Config;
use datasource_core::Error;
use serde::{Deserialize, Serialize};

pub const HOST_KEY: &str = "host";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub init_timeout_ms: u64,
    pub availability_timeout_ms: u64,
    pub operation_timeout_ms: u64,
    pub sources: BTreeMap<String, SourceSettings>,
}

/// Per-source overrides, keyed by the name the source is registered under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub enabled: bool,
    /// Upper bound applied to every `count` the host passes to this source.
    pub max_count: Option<usize>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: 30_000,
            availability_timeout_ms: 5_000,
            operation_timeout_ms: 10_000,
            sources: BTreeMap::new(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self { enabled: true, max_count: None }
    }
}

impl HostConfig {
    /// Load `[host]` from `datasource.toml` and friends, falling back to
    /// defaults when the table is absent.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_config(&Config::load()?)
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let host: Self = config.get_or_default(HOST_KEY)?;
        host.validate().context("invalid [host] configuration")?;
        Ok(host)
    }

    pub fn validate(&self) -> datasource_core::Result<()> {
        for (key, value) in [
            ("init_timeout_ms", self.init_timeout_ms),
            ("availability_timeout_ms", self.availability_timeout_ms),
            ("operation_timeout_ms", self.operation_timeout_ms),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("host.{} must be greater than zero", key)));
            }
        }
        for (name, settings) in &self.sources {
            if settings.max_count == Some(0) {
                return Err(Error::InvalidConfig(format!(
                    "host.sources.{}.max_count must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn settings_for(&self, name: &str) -> SourceSettings {
        self.sources.get(name).cloned().unwrap_or_default()
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    pub fn availability_timeout(&self) -> Duration {
        Duration::from_millis(self.availability_timeout_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}
