use shared::models::SheetKind;
use thiserror::Error;

use crate::data::column_resolver::ColumnRole;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    /// A required column role (vendor, item, price) matched no header.
    #[error("Missing column: no header matches the {role} column")]
    MissingColumn { role: ColumnRole },

    /// Not enough distinct vendors (or rows) to compare.
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Sheet '{0}' has not been loaded")]
    SheetNotLoaded(SheetKind),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Catch-all around the load/transform pipeline.
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl From<EngineError> for tonic::Status {
    fn from(err: EngineError) -> Self {
        tracing::error!("Mapping EngineError to tonic::Status: {:?}", err);
        match err {
            EngineError::ConfigError(msg) => tonic::Status::failed_precondition(format!("Configuration error: {}", msg)),
            EngineError::CsvSystemError { source } => tonic::Status::invalid_argument(format!("CSV parsing system error: {}", source)),
            EngineError::IoError { source } => tonic::Status::internal(format!("I/O error: {}", source)),
            err @ EngineError::MissingColumn { .. } => tonic::Status::invalid_argument(err.to_string()),
            EngineError::MissingData(msg) => tonic::Status::failed_precondition(format!("Missing data: {}", msg)),
            EngineError::ParseError(msg) => tonic::Status::invalid_argument(format!("Parse error: {}", msg)),
            err @ EngineError::SheetNotLoaded(_) => tonic::Status::failed_precondition(err.to_string()),
            EngineError::NotFound(msg) => tonic::Status::not_found(msg),
            EngineError::SessionError(msg) => tonic::Status::not_found(format!("Session error: {}", msg)),
            EngineError::InvalidRequest(msg) => tonic::Status::invalid_argument(msg),
            EngineError::AnyhowError(source) => tonic::Status::internal(format!("An internal error occurred: {}", source)),
        }
    }
}
