//! HTTP endpoint and timeout settings.

use serde::{Deserialize, Serialize};

/// Transport settings for the Generative Language API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Base URL up to and including the `models` path segment.
    pub base_url: String,
    /// Whole-request timeout in seconds (valid range: 1-600).
    pub timeout_secs: u32,
    /// TCP connect timeout in seconds (valid range: 1-60).
    pub connect_timeout_secs: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".into(),
            timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}
