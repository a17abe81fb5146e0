use thiserror::Error;

/// CLI configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file error: {0}")]
    Ini(String),

    #[error("Missing configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}
