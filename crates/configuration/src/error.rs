use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from the environment: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
