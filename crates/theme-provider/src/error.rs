//! Error types for the theme provider

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("use_theme must be used within a ThemeProvider")]
    NotInitialized,

    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Indicator error: {0}")]
    Indicator(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<::config::ConfigError> for ThemeError {
    fn from(err: ::config::ConfigError) -> Self {
        ThemeError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ThemeError>;
