use std::path::PathBuf;

use intake_core::{ItemId, Mode, Msg};

/// A line typed at the review prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Confirm,
    Remove(ItemId),
    Discard,
    Add(Vec<PathBuf>),
    More,
    Retry,
    Back,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help' for the list")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not an item number")]
    InvalidId(String),
}

impl Command {
    /// The core message for commands that map directly onto one.
    ///
    /// `confirm` sends the whole batch in batch review. Commands handled by
    /// the front-end itself (`add`, `help`, `quit`) return `None`.
    pub fn to_msg(&self, mode: Mode) -> Option<Msg> {
        match self {
            Command::Confirm if mode == Mode::ReviewBatch => Some(Msg::ConfirmAllClicked),
            Command::Confirm => Some(Msg::ConfirmClicked),
            Command::Remove(id) => Some(Msg::RemoveItem(*id)),
            Command::Discard => Some(Msg::DiscardClicked),
            Command::More => Some(Msg::AddMoreClicked),
            Command::Retry => Some(Msg::RetryClicked),
            Command::Back => Some(Msg::BackToReviewClicked),
            Command::Add(_) | Command::Help | Command::Quit => None,
        }
    }
}

pub const HELP: &str = "commands: confirm | remove <id> | discard | add <paths..> | more | retry | back | quit";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let command = match head.to_ascii_lowercase().as_str() {
        "confirm" | "c" | "send" => Command::Confirm,
        "remove" | "rm" => {
            let raw = words.next().ok_or(CommandError::MissingArgument("remove"))?;
            let id = raw
                .trim_start_matches('#')
                .parse()
                .map_err(|_| CommandError::InvalidId(raw.to_string()))?;
            Command::Remove(id)
        }
        "discard" => Command::Discard,
        "add" => {
            let paths: Vec<PathBuf> = words.map(PathBuf::from).collect();
            if paths.is_empty() {
                return Err(CommandError::MissingArgument("add"));
            }
            Command::Add(paths)
        }
        "more" => Command::More,
        "retry" => Command::Retry,
        "back" => Command::Back,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}
