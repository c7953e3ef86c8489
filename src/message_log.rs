//! Append-only session message log.

use chrono::{DateTime, Local};

use crate::models::{CharacterId, Message, MessageId, Sender};

/// Ordered record of every turn in the session, across all characters
#[derive(Debug, Default, Clone)]
pub struct MessageLog {
    messages: Vec<Message>,
    last_id: MessageId,
}

impl MessageLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return it.
    ///
    /// Ids come from the timestamp's millisecond clock, bumped past the
    /// previous id so two appends in the same millisecond never collide.
    pub fn append(
        &mut self,
        character_id: CharacterId,
        text: impl Into<String>,
        sender: Sender,
        timestamp: DateTime<Local>,
    ) -> &Message {
        let clock = u64::try_from(timestamp.timestamp_millis()).unwrap_or(0);
        let id = clock.max(self.last_id + 1);
        self.last_id = id;

        self.messages.push(Message {
            id,
            character_id,
            text: text.into(),
            sender,
            timestamp,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Every message in insertion order
    #[must_use]
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Messages for one character, in insertion order
    pub fn for_character(&self, character_id: CharacterId) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(move |m| m.character_id == character_id)
    }

    /// Most recently appended message for a character
    #[must_use]
    pub fn latest_for(&self, character_id: CharacterId) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.character_id == character_id)
    }

    /// Total number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when nothing has been sent yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
