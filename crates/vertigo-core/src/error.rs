use thiserror::Error;

/// Errors raised by shared Vertigo types and configuration loading.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Cannot convert {found} to {expected}")]
    Conversion {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid {expected} literal: {value}")]
    Parse {
        expected: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
