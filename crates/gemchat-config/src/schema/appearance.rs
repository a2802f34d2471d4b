//! Terminal presentation settings.

use serde::{Deserialize, Serialize};

/// Presentation options handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    pub dark_mode: bool,
    /// Print a timestamp next to each message.
    pub show_timestamps: bool,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            dark_mode: true,
            show_timestamps: false,
        }
    }
}
