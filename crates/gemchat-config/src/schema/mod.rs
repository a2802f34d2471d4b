//! Configuration schema types for gemchat.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod appearance;
mod model;
mod network;
mod system;

pub use appearance::*;
pub use model::*;
pub use network::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration for gemchat.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GemchatConfig {
    pub model: ModelConfig,
    pub network: NetworkConfig,
    pub appearance: AppearanceConfig,
    pub logging: LoggingConfig,
}
