// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Loads the client configuration from `VYAPAR_*` environment variables.
///
/// This function is the primary entry point for this crate. It reads the
/// prefixed variables, deserializes them into our strongly-typed `ApiConfig`
/// struct, validates the credentials, and returns it.
pub fn load_config() -> Result<ApiConfig, ConfigError> {
    build_config(config::Environment::with_prefix("VYAPAR"))
}

// Split out so tests can inject a synthetic variable source instead of
// mutating the process environment.
fn build_config(source: config::Environment) -> Result<ApiConfig, ConfigError> {
    let builder = config::Config::builder().add_source(source).build()?;

    // Attempt to deserialize the entire configuration into our `ApiConfig` struct
    let config = builder.try_deserialize::<ApiConfig>()?;
    config.validate()?;

    Ok(config)
}
