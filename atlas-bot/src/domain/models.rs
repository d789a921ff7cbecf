use atlas_core::{MapStyle, MarkerColor, UnknownMapStyleError, UnknownMarkerColorError};

use derive_more::{Display, From};
use thiserror::Error;

/// The chat user a command was sent by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From)]
pub struct UserId(i64);

impl UserId {
    pub fn raw(&self) -> i64 {
        self.0
    }
}

/// A chat command the bot understands, with its arguments already validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    ShowCity { name: String },
    RememberCity { name: String, color: MarkerColor },
    SetColor { name: String, color: MarkerColor },
    RemoveCity { name: String },
    ShowMyCities { style: MapStyle },
    Search { term: String },
    Stats,
    Distance { from: String, to: String },
    Colors,
    Styles,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("Commands start with a slash. Send /help to see what I can do.")]
    NotACommand,
    #[error("I don't know the command /{0}. Send /help to see what I can do.")]
    UnknownCommand(String),
    #[error("This command needs more to go on. Usage: {0}")]
    MissingArgument(&'static str),
    #[error("{0}. Send /colors to see the palette.")]
    Color(#[from] UnknownMarkerColorError),
    #[error("{0}. Send /styles to see the available styles.")]
    Style(#[from] UnknownMapStyleError),
}

impl Command {
    pub fn parse(text: &str) -> Result<Self, ParseCommandError> {
        let text = text.trim();
        let Some(body) = text.strip_prefix('/') else {
            return Err(ParseCommandError::NotACommand);
        };

        let (head, args) = match body.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (body, ""),
        };

        // Group chats address commands as /command@botname.
        let name = head.split('@').next().unwrap_or_default().to_lowercase();

        let command = match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "show_city" => Command::ShowCity {
                name: required(args, "/show_city London")?.to_string(),
            },
            "remember_city" => {
                let args = required(args, "/remember_city London [color]")?;
                let (name, color) = split_trailing_color(args);
                Command::RememberCity {
                    name: name.to_string(),
                    color: color.unwrap_or_default(),
                }
            }
            "set_color" => {
                let args = required(args, "/set_color London blue")?;
                let (name, color) = args
                    .rsplit_once(char::is_whitespace)
                    .ok_or(ParseCommandError::MissingArgument("/set_color London blue"))?;
                Command::SetColor {
                    name: name.trim().to_string(),
                    color: MarkerColor::try_from_str(color)?,
                }
            }
            "remove_city" => Command::RemoveCity {
                name: required(args, "/remove_city London")?.to_string(),
            },
            "show_my_cities" => Command::ShowMyCities {
                style: match args {
                    "" => MapStyle::default(),
                    style => MapStyle::try_from_str(style)?,
                },
            },
            "search" => Command::Search {
                term: required(args, "/search Lon")?.to_string(),
            },
            "stats" => Command::Stats,
            "distance" => {
                const USAGE: &str = "/distance London, Paris";

                let (from, to) = required(args, USAGE)?
                    .split_once(',')
                    .ok_or(ParseCommandError::MissingArgument(USAGE))?;
                Command::Distance {
                    from: required(from.trim(), USAGE)?.to_string(),
                    to: required(to.trim(), USAGE)?.to_string(),
                }
            }
            "colors" => Command::Colors,
            "styles" => Command::Styles,
            _ => return Err(ParseCommandError::UnknownCommand(name)),
        };

        Ok(command)
    }

    /// Short label for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::ShowCity { .. } => "show_city",
            Command::RememberCity { .. } => "remember_city",
            Command::SetColor { .. } => "set_color",
            Command::RemoveCity { .. } => "remove_city",
            Command::ShowMyCities { .. } => "show_my_cities",
            Command::Search { .. } => "search",
            Command::Stats => "stats",
            Command::Distance { .. } => "distance",
            Command::Colors => "colors",
            Command::Styles => "styles",
        }
    }
}

fn required<'a>(args: &'a str, usage: &'static str) -> Result<&'a str, ParseCommandError> {
    match args.trim() {
        "" => Err(ParseCommandError::MissingArgument(usage)),
        args => Ok(args),
    }
}

/// `New York blue` is New York with a blue marker. A lone word is always the city, so that
/// cities named like a color can still be saved.
fn split_trailing_color(args: &str) -> (&str, Option<MarkerColor>) {
    let Some((name, last)) = args.rsplit_once(char::is_whitespace) else {
        return (args, None);
    };

    match MarkerColor::try_from_str(last) {
        Ok(color) => (name.trim_end(), Some(color)),
        Err(_) => (args, None),
    }
}

/// A command to run on behalf of a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRequest {
    user_id: UserId,
    command: Command,
}

impl CommandRequest {
    pub fn new(user_id: UserId, command: Command) -> Self {
        Self { user_id, command }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

/// What the bot sends back to the chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Photo { png: Vec<u8>, caption: String },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("City storage failed: {0}")]
    Storage(anyhow::Error),
    #[error("Map rendering failed: {0}")]
    Rendering(anyhow::Error),
}

impl CommandError {
    /// The text shown to the user. Never carries internal details.
    pub fn user_message(&self) -> &'static str {
        match self {
            CommandError::Storage(_) => {
                "I couldn't reach my city records just now. Please try again in a moment."
            }
            CommandError::Rendering(_) => {
                "Something went wrong while drawing the map. Please try again."
            }
        }
    }
}
