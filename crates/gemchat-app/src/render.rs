//! Terminal rendering of messages, errors and the model list.
//!
//! The theme is passed in explicitly; nothing here reads global state.

use chrono::Local;
use colored::{Color, Colorize};
use gemchat_ai::models::{self, MODELS};
use gemchat_ai::{Message, Role};
use gemchat_config::schema::AppearanceConfig;

/// Colors for one appearance mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub user: Color,
    pub assistant: Color,
    pub error: Color,
    pub muted: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            user: Color::BrightCyan,
            assistant: Color::BrightGreen,
            error: Color::BrightRed,
            muted: Color::BrightBlack,
        }
    }

    pub fn light() -> Self {
        Self {
            user: Color::Blue,
            assistant: Color::Green,
            error: Color::Red,
            muted: Color::Black,
        }
    }

    pub fn from_appearance(appearance: &AppearanceConfig) -> Self {
        if appearance.dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Gemini",
    }
}

/// Render one message as `Label [time]: content`.
pub fn message(msg: &Message, theme: &Theme, show_timestamps: bool) -> String {
    let color = match msg.role() {
        Role::User => theme.user,
        Role::Assistant => theme.assistant,
    };
    let label = role_label(msg.role()).color(color).bold();
    let stamp = if show_timestamps {
        let time = msg.timestamp().with_timezone(&Local).format("%H:%M:%S");
        format!(" {}", format!("[{time}]").color(theme.muted))
    } else {
        String::new()
    };
    format!("{label}{stamp}: {}", msg.content())
}

/// Render the error banner with a retry hint.
pub fn error(text: &str, theme: &Theme) -> String {
    format!(
        "{} {text} {}",
        "error:".color(theme.error).bold(),
        "(type /retry to try again)".color(theme.muted)
    )
}

/// Render a note in the muted color.
pub fn note(text: &str, theme: &Theme) -> String {
    text.color(theme.muted).to_string()
}

/// Render the model catalog, marking the current selection.
pub fn model_list(current: &str, theme: &Theme) -> String {
    MODELS
        .iter()
        .map(|m| {
            let marker = if m.id == current { "*" } else { " " };
            format!(
                "{marker} {:<18} {} {}",
                m.id,
                m.name,
                format!("- {}", m.description).color(theme.muted)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn banner(model: &str, theme: &Theme) -> String {
    format!(
        "gemchat ({}). {}",
        models::display_name(model),
        note("Type /help for commands.", theme)
    )
}

pub fn help(theme: &Theme) -> String {
    let lines = [
        "/retry          resend the last message",
        "/clear          start over with an empty conversation",
        "/model [id]     list models, or switch to <id> (keeps history)",
        "/key <api-key>  use a different API key (clears history)",
        "/history        print the conversation so far",
        "/quit           exit",
        "End a line with \\ to continue the message on the next line.",
        "Start a message with // to send a literal leading slash.",
    ];
    note(&lines.join("\n"), theme)
}
