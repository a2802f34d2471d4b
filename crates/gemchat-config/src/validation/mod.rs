//! Full configuration validation.
//!
//! Collects every range and presence violation into a single
//! `ConfigError::ValidationError`.

mod helpers;


use crate::schema::GemchatConfig;
use gemchat_common::ConfigError;

use helpers::{validate_non_empty, validate_range, validate_range_f64};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &GemchatConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_non_empty(&mut errors, "model.name", &config.model.name);
    validate_range(&mut errors, "model.max_tokens", config.model.max_tokens, 1, 65536);
    validate_range_f64(&mut errors, "model.temperature", config.model.temperature, 0.0, 2.0);

    validate_non_empty(&mut errors, "network.base_url", &config.network.base_url);
    validate_range(&mut errors, "network.timeout_secs", config.network.timeout_secs, 1, 600);
    validate_range(
        &mut errors,
        "network.connect_timeout_secs",
        config.network.connect_timeout_secs,
        1,
        60,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
