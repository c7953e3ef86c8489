//! Data models for characters, messages and navigation
//!
//! This module contains the plain records shared by the catalog, the message
//! log, the session reducer and the screens.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier of a character
pub type CharacterId = u32;

/// Identifier of a message, derived from a monotonic millisecond clock
pub type MessageId = u64;

/// A selectable chat persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Unique catalog id
    pub id: CharacterId,
    /// Display name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Portrait URL
    pub image: String,
    /// Short pitch shown on the gallery card
    pub description: String,
    /// Personality line shown when a conversation is empty
    pub personality: String,
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person using the app
    User,
    /// The persona's reply
    Ai,
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique id within the session
    pub id: MessageId,
    /// Character this turn belongs to
    pub character_id: CharacterId,
    /// Message text
    pub text: String,
    /// Author of the turn
    pub sender: Sender,
    /// When the turn was appended
    pub timestamp: DateTime<Local>,
}

impl Message {
    /// `HH:MM` rendering used by the chat screen
    #[must_use]
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Screens reachable once the age gate is passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    /// Character carousel
    Gallery,
    /// Conversation with the selected character
    Chat,
    /// Paywall and plan selection
    Subscription,
    /// Account status and conversation history
    Profile,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gallery => "gallery",
            Self::Chat => "chat",
            Self::Subscription => "subscription",
            Self::Profile => "profile",
        };
        f.write_str(name)
    }
}

/// A subscription offer on the paywall
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Identifier passed to `Subscribe`
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Price in roubles
    pub price_rub: u32,
    /// Bullet points listed under the plan
    pub features: &'static [&'static str],
    /// Highlighted as the recommended plan
    pub popular: bool,
}

/// Token identifying one in-flight reply request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
