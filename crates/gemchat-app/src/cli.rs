use clap::Parser;

/// gemchat - chat with Google Gemini models from the terminal.
#[derive(Parser, Debug)]
#[command(name = "gemchat", version, about)]
pub struct Args {
    /// Gemini API key. Falls back to GEMINI_API_KEY, then an interactive prompt.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model id override (e.g. gemini-1.5-pro).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use the light color theme.
    #[arg(long, conflicts_with = "dark")]
    pub light: bool,

    /// Use the dark color theme.
    #[arg(long)]
    pub dark: bool,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_model_and_theme_flags() {
        let args = Args::try_parse_from(["gemchat", "--model", "gemini-1.5-pro", "--light"]).unwrap();
        assert_eq!(args.model.as_deref(), Some("gemini-1.5-pro"));
        assert!(args.light);
        assert!(!args.dark);
    }

    #[test]
    fn print_config_defaults_to_off() {
        let args = Args::try_parse_from(["gemchat"]).unwrap();
        assert!(!args.print_config);
        let args = Args::try_parse_from(["gemchat", "--print-config"]).unwrap();
        assert!(args.print_config);
    }

    #[test]
    fn light_and_dark_conflict() {
        assert!(Args::try_parse_from(["gemchat", "--light", "--dark"]).is_err());
    }
}
