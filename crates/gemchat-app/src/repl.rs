//! Interactive read-eval-print loop over a `ChatSession`.

use std::io::{self, Write};

use gemchat_ai::models::{display_name, find_model};
use gemchat_ai::{ChatSession, GeminiConfig, GenerationError, Role};
use tokio::io::{AsyncBufRead, Lines};
use tracing::{info, warn};

use crate::render::{self, Theme};

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Retry,
    Clear,
    Model(Option<String>),
    Key(String),
    History,
    Help,
    Quit,
    Unknown(String),
}

/// Parse a line of input. Lines starting with `/` are commands; `//`
/// escapes a message that really begins with a slash.
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if trimmed.starts_with("//") {
        return Command::Send(trimmed[1..].to_string());
    }
    let Some(cmd) = trimmed.strip_prefix('/') else {
        return Command::Send(input.to_string());
    };

    let (name, arg) = match cmd.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (cmd, ""),
    };

    match name {
        "retry" => Command::Retry,
        "clear" => Command::Clear,
        "model" => Command::Model((!arg.is_empty()).then(|| arg.to_string())),
        "key" => Command::Key(arg.to_string()),
        "history" => Command::History,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

/// Build a Gemini-backed session that reports failures to the log.
pub fn connect(config: &GeminiConfig) -> Result<ChatSession, GenerationError> {
    let session = ChatSession::connect(config.clone())?;
    Ok(session.with_error_observer(Box::new(|err: &GenerationError| {
        warn!(error = ?err, "chat error");
    })))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl<W> {
    session: ChatSession,
    client_config: GeminiConfig,
    theme: Theme,
    show_timestamps: bool,
    out: W,
}

impl<W: Write> Repl<W> {
    pub fn new(
        session: ChatSession,
        client_config: GeminiConfig,
        theme: Theme,
        show_timestamps: bool,
        out: W,
    ) -> Self {
        Self {
            session,
            client_config,
            theme,
            show_timestamps,
            out,
        }
    }

    pub fn model(&self) -> &str {
        &self.client_config.model
    }

    /// Read lines until EOF or `/quit`.
    ///
    /// A line ending in `\` is joined with the next one.
    pub async fn run<R>(&mut self, mut lines: Lines<R>) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        writeln!(self.out, "{}", render::banner(self.model(), &self.theme))?;

        let mut buffer = String::new();
        loop {
            write!(self.out, "{}", if buffer.is_empty() { "> " } else { ". " })?;
            self.out.flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if let Some(partial) = line.strip_suffix('\\') {
                buffer.push_str(partial);
                buffer.push('\n');
                continue;
            }
            buffer.push_str(&line);

            let input = std::mem::take(&mut buffer);
            if self.handle(&input).await? == Flow::Quit {
                break;
            }
        }

        writeln!(self.out)?;
        Ok(())
    }

    pub async fn handle(&mut self, input: &str) -> io::Result<Flow> {
        match parse_command(input) {
            Command::Send(text) => {
                if !text.trim().is_empty() {
                    self.session.send(text).await;
                    self.report_outcome()?;
                }
            }
            Command::Retry => {
                if self.session.last_user_utterance().is_empty() {
                    self.note("Nothing to retry.")?;
                } else {
                    self.session.retry().await;
                    self.report_outcome()?;
                }
            }
            Command::Clear => {
                self.session.clear();
                self.note("Conversation cleared.")?;
            }
            Command::Model(None) => {
                writeln!(self.out, "{}", render::model_list(self.model(), &self.theme))?;
            }
            Command::Model(Some(id)) => self.switch_model(&id)?,
            Command::Key(key) => self.replace_key(key)?,
            Command::History => {
                let messages = self.session.messages();
                if messages.is_empty() {
                    self.note("No messages yet.")?;
                }
                for msg in &messages {
                    writeln!(
                        self.out,
                        "{}",
                        render::message(msg, &self.theme, self.show_timestamps)
                    )?;
                }
            }
            Command::Help => writeln!(self.out, "{}", render::help(&self.theme))?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Unknown(name) => {
                self.note(&format!("Unknown command /{name}. Type /help for commands."))?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Print the error banner or the newest reply.
    fn report_outcome(&mut self) -> io::Result<()> {
        if let Some(err) = self.session.last_error() {
            return writeln!(self.out, "{}", render::error(&err, &self.theme));
        }
        if let Some(last) = self.session.messages().last() {
            if last.role() == Role::Assistant {
                writeln!(
                    self.out,
                    "{}",
                    render::message(last, &self.theme, self.show_timestamps)
                )?;
            }
        }
        Ok(())
    }

    /// Switch models with a fresh client, carrying the transcript over.
    fn switch_model(&mut self, id: &str) -> io::Result<()> {
        if find_model(id).is_none() {
            return self.note(&format!("Unknown model {id}. Type /model to list models."));
        }

        let config = self.client_config.clone().with_model(id);
        match connect(&config) {
            Ok(session) => {
                self.session = session
                    .with_history(self.session.messages())
                    .with_last_utterance(self.session.last_user_utterance());
                self.client_config = config;
                info!(model = id, "model switched");
                self.note(&format!("Switched to {}.", display_name(id)))
            }
            Err(err) => writeln!(self.out, "{}", render::error(&err.to_string(), &self.theme)),
        }
    }

    /// Replace the credential. A new credential starts a new conversation.
    fn replace_key(&mut self, key: String) -> io::Result<()> {
        if key.is_empty() {
            return self.note("Usage: /key <api-key>");
        }
        let config = GeminiConfig {
            api_key: key,
            ..self.client_config.clone()
        };
        match connect(&config) {
            Ok(session) => {
                self.session = session;
                self.client_config = config;
                info!("API key replaced; conversation reset");
                self.note("API key updated. Conversation cleared.")
            }
            Err(err) => writeln!(self.out, "{}", render::error(&err.to_string(), &self.theme)),
        }
    }

    fn note(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", render::note(text, &self.theme))
    }
}
