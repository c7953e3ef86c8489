//! Profile history: a read-only projection of the message log.

use crate::catalog::Catalog;
use crate::message_log::MessageLog;
use crate::models::{Character, Message};

/// One conversation on the profile screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry<'a> {
    /// Who the conversation is with
    pub character: &'a Character,
    /// Latest turn in the conversation
    pub last_message: &'a Message,
    /// Number of turns exchanged
    pub message_count: usize,
}

/// Conversations with at least one message, most recently active first.
///
/// Ties on the latest timestamp keep catalog order.
#[must_use]
pub fn chat_history<'a>(catalog: &'a Catalog, log: &'a MessageLog) -> Vec<HistoryEntry<'a>> {
    let mut entries: Vec<HistoryEntry<'a>> = catalog
        .characters()
        .iter()
        .filter_map(|character| {
            let last_message = log.latest_for(character.id)?;
            Some(HistoryEntry {
                character,
                last_message,
                message_count: log.for_character(character.id).count(),
            })
        })
        .collect();

    entries.sort_by(|a, b| b.last_message.timestamp.cmp(&a.last_message.timestamp));
    entries
}
