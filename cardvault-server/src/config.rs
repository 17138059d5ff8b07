use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub provisioning: ProvisioningConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// "memory", "sqlite::memory:", or "sqlite:<path>"
    #[serde(default = "default_descriptor")]
    pub descriptor: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvisioningConfig {
    #[serde(default = "default_initial_algorithm")]
    pub initial_algorithm: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_content_size")]
    pub max_content_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            descriptor: default_descriptor(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            initial_algorithm: default_initial_algorithm(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_content_size: default_max_content_size(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    7333
}
fn default_descriptor() -> String {
    "memory".into()
}
fn default_busy_timeout_ms() -> u64 {
    5_000
}
fn default_initial_algorithm() -> String {
    "sha256".into()
}
fn default_max_retries() -> u32 {
    cardvault_core::retry::DEFAULT_MAX_RETRIES
}
fn default_base_delay_ms() -> u64 {
    50
}
fn default_max_content_size() -> usize {
    cardvault_core::DEFAULT_MAX_CONTENT_SIZE
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("cardvault-server.toml"))
                .merge(Env::prefixed("CARDVAULT_").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Config = figment.extract()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: StorageConfig::default(),
            provisioning: ProvisioningConfig::default(),
        }
    }
}
