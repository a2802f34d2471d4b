//! Turns CLI flags and the loaded config into runtime settings.

use gemchat_ai::models::find_model;
use gemchat_ai::GeminiConfig;
use gemchat_config::schema::LogLevel;
use gemchat_config::GemchatConfig;
use tracing::warn;

use crate::cli::Args;
use crate::render::Theme;

/// Filter directive for the gemchat crates.
///
/// `--log-level` wins over the config file. A value containing `=` is
/// taken as a full directive.
pub fn log_directive(cli_level: Option<&str>, config_level: LogLevel) -> String {
    match cli_level.map(str::trim).filter(|l| !l.is_empty()) {
        Some(level) if level.contains('=') => level.to_string(),
        Some(level) => format!("gemchat={}", level.to_ascii_lowercase()),
        None => format!("gemchat={}", config_level.as_directive()),
    }
}

/// The non-blank credential from `--api-key` / `GEMINI_API_KEY`, if any.
pub fn api_key(args: &Args) -> Option<String> {
    args.api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Model id to start with: `--model`, else the config file.
pub fn model_id(args: &Args, config: &GemchatConfig) -> String {
    let model = args.model.clone().unwrap_or_else(|| config.model.name.clone());
    if find_model(&model).is_none() {
        warn!(model = %model, "model is not in the catalog; using it as given");
    }
    model
}

/// Client settings for `api_key` built from the config file and flags.
pub fn gemini_config(args: &Args, config: &GemchatConfig, api_key: String) -> GeminiConfig {
    GeminiConfig::new(api_key)
        .with_model(model_id(args, config))
        .with_base_url(config.network.base_url.clone())
        .with_max_tokens(config.model.max_tokens)
        .with_temperature(config.model.temperature)
        .with_timeouts(
            u64::from(config.network.timeout_secs),
            u64::from(config.network.connect_timeout_secs),
        )
}

pub fn theme(args: &Args, config: &GemchatConfig) -> Theme {
    if args.light {
        Theme::light()
    } else if args.dark {
        Theme::dark()
    } else {
        Theme::from_appearance(&config.appearance)
    }
}
