//! Remote model selection and generation parameters.

use serde::{Deserialize, Serialize};

/// Which remote model to talk to and how to sample from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier, e.g. `gemini-2.0-flash`.
    pub name: String,
    /// Upper bound on generated tokens (valid range: 1-65536).
    pub max_tokens: u32,
    /// Sampling temperature (valid range: 0.0-2.0).
    pub temperature: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.0-flash".into(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}
