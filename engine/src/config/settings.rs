// Engine settings, loaded from a JSON config file with environment overrides.
use serde::Deserialize;
use shared::models::SheetKind;
use std::path::Path;

use super::rules::{PricingRules, DEFAULT_HISTORY_PREFIX};
use crate::error::EngineError;

pub const CONFIG_PATH_ENV: &str = "PRICE_ENGINE_CONFIG";
pub const HOST_ENV: &str = "PRICE_ENGINE_HOST";
pub const PORT_ENV: &str = "PRICE_ENGINE_PORT";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.json";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub data: DataSettings,
    pub rules: PricingRules,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            host: "127.0.0.1".to_string(),
            port: 50052,
            log_level: "info".to_string(),
            data: DataSettings::default(),
            rules: PricingRules::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataSettings {
    pub delimiter: String, // Should be a single byte, but JSON string is easier
    pub purchase_path: String,
    pub sales_path: String,
    pub history_prefix: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        DataSettings {
            delimiter: ",".to_string(),
            purchase_path: "data/purchase_prices.csv".to_string(),
            sales_path: "data/sales_prices.csv".to_string(),
            history_prefix: DEFAULT_HISTORY_PREFIX.to_string(),
        }
    }
}

impl DataSettings {
    pub fn delimiter_byte(&self) -> Result<u8, EngineError> {
        match self.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ if self.delimiter == "\\t" => Ok(b'\t'),
            _ => Err(EngineError::ConfigError(format!(
                "CSV delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ))),
        }
    }

    pub fn default_path(&self, sheet: SheetKind) -> &str {
        match sheet {
            SheetKind::Purchase => &self.purchase_path,
            SheetKind::Sales => &self.sales_path,
        }
    }
}

impl EngineSettings {
    /// Loads settings from `$PRICE_ENGINE_CONFIG` (or the default path), then applies
    /// host/port overrides from the environment. A missing file yields the defaults.
    pub fn load() -> Result<Self, EngineError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut settings = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            tracing::warn!(path = %path, "Config file not found, using built-in defaults");
            Self::default()
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &str) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw).map_err(|e| match e {
            EngineError::ConfigError(msg) => EngineError::ConfigError(format!("{}: {}", path, msg)),
            other => other,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let settings: EngineSettings =
            serde_json::from_str(raw).map_err(|e| EngineError::ConfigError(e.to_string()))?;
        settings.data.delimiter_byte()?;
        Ok(settings)
    }

    fn apply_env_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) -> Result<(), EngineError> {
        if let Some(host) = lookup(HOST_ENV) {
            self.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port
                .parse()
                .map_err(|e| EngineError::ConfigError(format!("Invalid {} '{}': {}", PORT_ENV, port, e)))?;
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
