//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# gemchat configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# The API key is never read from this file. Pass --api-key or set
# GEMINI_API_KEY instead.

[model]
name = "gemini-2.0-flash"  # gemini-2.0-flash | gemini-1.5-pro | gemini-1.5-flash
# max_tokens = 4096        # 1-65536
# temperature = 0.7        # 0.0-2.0

[network]
# base_url = "https://generativelanguage.googleapis.com/v1beta/models"
# timeout_secs = 120       # 1-600
# connect_timeout_secs = 10  # 1-60

[appearance]
dark_mode = true
# show_timestamps = false

[logging]
# level = "WARNING"        # DEBUG | INFO | WARNING | ERROR
"##
}
