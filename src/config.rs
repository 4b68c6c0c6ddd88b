use std::{net::SocketAddr, path::Path};

use anyhow::{anyhow, Result};
use caching::CacheConfig;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use storage_provider::StorageConfig;

/// Environment variables with this prefix override file settings. Nested
/// keys are separated by `__`, e.g. `ACP_STORAGE__BLOB__CONTAINER`.
const ENV_PREFIX: &str = "ACP_";

/// Flat variable names understood by earlier deployments, and the setting
/// each one maps to. The prefixed form wins when both are set.
const LEGACY_ENV: [(&str, &str); 5] = [
    ("ACP_STORAGE_CONNECTION", "storage.blob.connection"),
    ("ACP_BLOB_CONTAINER", "storage.blob.container"),
    ("USE_REDIS", "cache.enabled"),
    ("REDIS_HOST", "cache.host"),
    ("REDIS_PORT", "cache.port"),
];

fn legacy_env() -> Env {
    Env::raw().filter_map(|key| {
        LEGACY_ENV
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, path)| (*path).into())
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub structured_logging: bool,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: "0.0.0.0:8080".to_string(),
            structured_logging: false,
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_path(path: &Path) -> Result<ServerConfig> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("unable to read config file {}: {}", path.display(), e))?;
        Self::from_figment(Figment::new().merge(Yaml::string(&config_str)))
    }

    /// Defaults overridden by the environment only.
    pub fn from_env() -> Result<ServerConfig> {
        Self::from_figment(Figment::from(Serialized::defaults(ServerConfig::default())))
    }

    fn from_figment(figment: Figment) -> Result<ServerConfig> {
        let config: ServerConfig = figment
            .merge(legacy_env())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(anyhow!("invalid listen address: {}", self.listen_addr));
        }
        if self.storage.targets().is_empty() {
            return Err(anyhow!("at least one storage backend must be configured"));
        }
        self.storage.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}
