use thiserror::Error;

use feesbook_config::ConfigError;
use feesbook_core::LedgerError;

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Command failed: {0}")]
    Command(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(err: dialoguer::Error) -> Self {
        AppError::Input(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
