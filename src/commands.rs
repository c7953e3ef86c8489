//! Maps typed lines from the terminal to session intents.

use crate::models::Page;
use crate::session::{Action, GalleryAction};
use crate::validation::InputValidator;

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// An intent for the session
    Dispatch(Action),
    /// Print the command list
    Help,
    /// Leave the session
    Quit,
    /// Blank line; the send action is disabled for it
    Empty,
    /// A slash command that could not be understood
    Invalid(String),
}

/// Shown for `/help`
pub const HELP: &str = "\
Commands:
  /yes                 confirm you are 18+
  /next /prev          browse the gallery
  /go <n>              jump to card n
  /start               chat with the card shown
  /open <id>           reopen a conversation
  /gallery /profile    switch screens
  /premium             show subscription plans
  /subscribe <plan>    activate a plan
  /back                go back
  /quit                leave
Anything else is sent as a message.";

/// Parse one input line
#[must_use]
pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Dispatch(Action::SendMessage(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();

    let action = match (name.as_str(), arg) {
        ("help" | "?", _) => return Command::Help,
        ("quit" | "exit", _) => return Command::Quit,
        ("yes", _) => Action::VerifyAge,
        ("next", _) => Action::Gallery(GalleryAction::Next),
        ("prev", _) => Action::Gallery(GalleryAction::Prev),
        ("start", _) => Action::Gallery(GalleryAction::StartChat),
        ("back", _) => Action::Back,
        ("gallery", _) => Action::Navigate(Page::Gallery),
        ("chat", _) => Action::Navigate(Page::Chat),
        ("profile", _) => Action::Navigate(Page::Profile),
        ("premium", _) => Action::Navigate(Page::Subscription),
        ("go", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Action::Gallery(GalleryAction::Jump(n - 1)),
            _ => return Command::Invalid(format!("not a card number: {n}")),
        },
        ("open", Some(id)) => match id.parse() {
            Ok(id) => Action::OpenHistory(id),
            Err(_) => return Command::Invalid(format!("not a character id: {id}")),
        },
        ("subscribe", Some(plan)) => match InputValidator::validate_plan_id(plan) {
            Ok(()) => Action::Subscribe(plan.to_lowercase()),
            Err(e) => return Command::Invalid(e.to_string()),
        },
        (other, _) => return Command::Invalid(format!("unknown command: /{other}")),
    };
    Command::Dispatch(action)
}
