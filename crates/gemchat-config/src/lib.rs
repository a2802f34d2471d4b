//! gemchat configuration system.
//!
//! Provides TOML-based configuration with validation. All config
//! sections use sensible defaults so partial configs work out of the box.
//! The API credential is deliberately not part of the schema: it is
//! supplied at runtime and never written to disk.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gemchat_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::GemchatConfig;

use gemchat_common::ConfigError;
use std::path::Path;

/// Load config from the platform default path.
///
/// Loads `config.toml` from the OS config directory, creates a default
/// if none exists, and validates the result.
pub fn load_config() -> Result<GemchatConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path, or the platform default when `None`.
///
/// An explicit path must exist; unlike the default location it is never
/// created on demand.
pub fn load_config_from(path: Option<&Path>) -> Result<GemchatConfig, ConfigError> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            let config = toml_loader::load_from_path(path)?;
            validation::validate(&config)?;
            Ok(config)
        }
        None => load_config(),
    }
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &GemchatConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
