// server/src/config.rs
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use models::errors::{MarketError, MarketResult};

const DEFAULT_CONFIG_PATH: &str = "medimarket.yaml";
const CONFIG_PATH_ENV: &str = "MEDIMARKET_CONFIG";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayCredentials {
    pub secret_key: String,
    /// Override for staging endpoints; the processor default is used when
    /// absent.
    pub base_url: Option<String>,
}

impl Default for GatewayCredentials {
    fn default() -> Self {
        GatewayCredentials {
            secret_key: String::new(),
            base_url: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Externally reachable base URL, used to build gateway redirect
    /// targets.
    pub public_base_url: String,
    /// Where payment callbacks send the patient's browser afterwards.
    pub dashboard_url: String,
    pub currency: String,
    pub flutterwave: GatewayCredentials,
    pub paystack: GatewayCredentials,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: "127.0.0.1:8080".to_string(),
            public_base_url: "http://127.0.0.1:8080".to_string(),
            dashboard_url: "http://127.0.0.1:8080/dashboard".to_string(),
            currency: "NGN".to_string(),
            flutterwave: GatewayCredentials::default(),
            paystack: GatewayCredentials::default(),
        }
    }
}

impl ServerConfig {
    /// Loads the YAML config from `MEDIMARKET_CONFIG` (or the default
    /// path). A missing file falls back to defaults; a malformed one is an
    /// error.
    pub fn load() -> MarketResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        if !Path::new(&path).exists() {
            warn!("config file {} not found, using defaults", path);
            return Ok(ServerConfig::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let config: ServerConfig = serde_yaml2::from_str(&raw)
            .map_err(|e| MarketError::ConfigurationError(format!("{}: {}", path, e)))?;
        info!("configuration loaded from {}", path);
        Ok(config)
    }
}
