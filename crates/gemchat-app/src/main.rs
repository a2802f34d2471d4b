mod cli;
mod render;
mod repl;
mod setup;

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use gemchat_common::{GemchatError, Result};
use gemchat_config::GemchatConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Split a `.env` line into a key and an unquoted value.
///
/// Blank lines, `#` comments and lines without `=` yield `None`. An
/// optional `export ` prefix is accepted.
fn parse_env_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
        .unwrap_or(value);
    Some((key, value))
}

/// Export variables from the first `.env` found (working directory, then
/// the workspace root). Values already in the environment win.
fn load_dotenv() {
    let workspace_env = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../.env");
    let Some(contents) = [Path::new(".env"), workspace_env.as_path()]
        .into_iter()
        .find_map(|path| std::fs::read_to_string(path).ok())
    else {
        return;
    };

    for (key, value) in contents.lines().filter_map(parse_env_line) {
        if std::env::var_os(key).is_none() {
            std::env::set_var(key, value);
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` takes precedence.
fn init_logging(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(args: cli::Args) -> Result<()> {
    let loaded = gemchat_config::load_config_from(args.config.as_deref().map(Path::new));

    let config_level = loaded
        .as_ref()
        .map(|c| c.logging.level)
        .unwrap_or_default();
    init_logging(&setup::log_directive(args.log_level.as_deref(), config_level));
    tracing::info!("gemchat v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        // An explicitly named config file has to be usable.
        Err(e) if args.config.is_some() => return Err(e.into()),
        Err(e) => {
            tracing::warn!("Config load failed, using defaults: {e}");
            GemchatConfig::default()
        }
    };
    tracing::info!(model = %config.model.name, "config loaded");

    if args.print_config {
        println!("{}", gemchat_config::config_to_json(&config));
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let api_key = match setup::api_key(&args) {
        Some(key) => key,
        None => {
            print!("Gemini API key: ");
            io::stdout().flush()?;
            lines
                .next_line()
                .await?
                .map(|line| line.trim().to_string())
                .filter(|key| !key.is_empty())
                .ok_or_else(|| GemchatError::Credential("no API key provided".into()))?
        }
    };

    let client_config = setup::gemini_config(&args, &config, api_key);
    let session = repl::connect(&client_config).map_err(|e| GemchatError::Ai(e.to_string()))?;

    let mut repl = repl::Repl::new(
        session,
        client_config,
        setup::theme(&args, &config),
        config.appearance.show_timestamps,
        io::stdout(),
    );
    repl.run(lines).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    load_dotenv();

    let args = cli::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gemchat: {e}");
            ExitCode::FAILURE
        }
    }
}
