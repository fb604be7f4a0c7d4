//! Runtime configuration.
//!
//! Read once at startup from an optional TOML file, then overridden by
//! `FUSION_*` environment variables (`FUSION_PORT`, `FUSION_CACHE_TABLE`,
//! `FUSION_WEATHER_API_KEY`, ...). Every field has a default, so an empty
//! environment yields a runnable, if credential-less, server.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use config::{Config, Environment, File};
use fusion_store_sqlite::Tables;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "FUSION";
pub const DEFAULT_CONFIG_PATH: &str = "fusion.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                      String,
  pub port:                      u16,
  pub database_path:             PathBuf,
  pub cache_table:               String,
  pub data_table:                String,
  pub cognito_region:            String,
  pub cognito_client_id:         String,
  /// Overrides the regional Cognito endpoint, e.g. for a local emulator.
  pub cognito_endpoint:          Option<String>,
  pub weather_api_key:           String,
  pub registry_base_url:         String,
  pub weather_base_url:          String,
  pub request_timeout_secs:      u64,
  pub cache_ttl_secs:            u64,
  /// `0` disables the purge task.
  pub cache_purge_interval_secs: u64,
  pub require_token:             bool,
  /// Local development: no HTTP trace layer, no step observer.
  pub offline:                   bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                      "127.0.0.1".to_owned(),
      port:                      3000,
      database_path:             PathBuf::from("fusion.db"),
      cache_table:               "fusion_cache".to_owned(),
      data_table:                "fusion_data".to_owned(),
      cognito_region:            fusion_auth::cognito::DEFAULT_REGION.to_owned(),
      cognito_client_id:         String::new(),
      cognito_endpoint:          None,
      weather_api_key:           String::new(),
      registry_base_url:         fusion_upstream::registry::DEFAULT_BASE_URL.to_owned(),
      weather_base_url:          fusion_upstream::weather::DEFAULT_BASE_URL.to_owned(),
      request_timeout_secs:      fusion_upstream::DEFAULT_TIMEOUT.as_secs(),
      cache_ttl_secs:            fusion_core::cache::DEFAULT_TTL.as_secs(),
      cache_purge_interval_secs: 300,
      require_token:             false,
      offline:                   false,
    }
  }
}

impl ServerConfig {
  /// Load from `path` (if it exists) layered under `FUSION_*` variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
  }

  fn load_with(path: &Path, env: Environment) -> Result<Self, config::ConfigError> {
    Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn tables(&self) -> fusion_store_sqlite::Result<Tables> {
    Tables::new(&self.cache_table, &self.data_table)
  }

  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

  pub fn cache_ttl(&self) -> Duration { Duration::from_secs(self.cache_ttl_secs) }

  pub fn cache_purge_interval(&self) -> Duration {
    Duration::from_secs(self.cache_purge_interval_secs)
  }
}
