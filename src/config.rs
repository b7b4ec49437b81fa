use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;

use crate::models::DEFAULT_COLUMNS;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_token_mint")]
    pub include_token_mints: String,
    /// Unset leaves the transport's own timeout behavior in place.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

/// Defaults for a pipeline run when the caller does not override them.
#[derive(Debug, Deserialize, Clone)]
pub struct ViewConfig {
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default = "default_target_liquidity")]
    pub target_liquidity: f64,
    #[serde(default = "default_min_liquidity")]
    pub min_liquidity: f64,
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_api_url() -> String { "https://dlmm-api.meteora.ag/pair/all_with_pagination".to_string() }
fn default_limit() -> u32 { 100 }
fn default_token_mint() -> String { "So11111111111111111111111111111111111111112".to_string() }
fn default_ttl_secs() -> u64 { 300 }
fn default_period() -> String { "24 Hours".to_string() }
fn default_target_liquidity() -> f64 { 1000.0 }
fn default_min_liquidity() -> f64 { 5000.0 }
fn default_columns() -> Vec<String> { DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect() }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            limit: default_limit(),
            include_token_mints: default_token_mint(),
            timeout_secs: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: default_ttl_secs() }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            target_liquidity: default_target_liquidity(),
            min_liquidity: default_min_liquidity(),
            columns: default_columns(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Reads `config.toml`; a missing file falls back to defaults.
    pub fn load_or_default() -> Result<Self, Box<dyn std::error::Error>> {
        match fs::read_to_string("config.toml") {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("config.toml not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
