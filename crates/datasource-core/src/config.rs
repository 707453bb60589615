//! Layered configuration for hosts and source implementations.
//!
//! Uses Figment to merge `datasource.toml` + `datasource.<env>.toml` + `APP_*`
//! env vars, where `<env>` comes from `RUST_ENV` (default `dev`). A double
//! underscore in an env var name descends into a table, so
//! `APP_HOST__OPERATION_TIMEOUT_MS` sets `host.operation_timeout_ms`.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::de::DeserializeOwned;
use std::env;

use crate::error::Error;

pub const BASE_FILE: &str = "datasource.toml";
pub const ENV_PREFIX: &str = "APP_";

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(BASE_FILE));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("datasource.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("datasource.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("datasource.test.toml")),
            other => return Err(Error::InvalidConfig(format!("unknown RUST_ENV '{}'", other)).into()),
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Ok(Self { figment, env_name: env_name.to_string() })
    }

    /// Wrap an already assembled figment, e.g. one built in a test.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment, env_name: "custom".to_string() }
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Like [`get`](Self::get) but falls back to `T::default()` when `key` is
    /// not configured at all. A present but malformed value is still an error.
    pub fn get_or_default<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: DeserializeOwned + Default,
    {
        if self.figment.contains(key) { self.get(key) } else { Ok(T::default()) }
    }
}
