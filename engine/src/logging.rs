// Tracing subscriber setup for the engine binary.
use tracing::Level;

use crate::error::EngineError;

pub fn parse_level(raw: &str) -> Result<Level, EngineError> {
    raw.trim()
        .parse::<Level>()
        .map_err(|_| EngineError::ConfigError(format!("Unknown log level '{}'", raw)))
}

/// Installs the global fmt subscriber. Call once, before anything logs.
pub fn init(level: &str) -> Result<(), EngineError> {
    let level = parse_level(level)?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|e| EngineError::ConfigError(format!("Failed to install log subscriber: {}", e)))
}
