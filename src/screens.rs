//! Plain-text renderings of each screen.
//!
//! Every function here is a pure read of [`SessionState`]; none of them
//! mutate anything. The terminal front-end prints whatever they return.

use std::fmt::Write;

use crate::catalog::PLANS;
use crate::history::chat_history;
use crate::models::{Page, Sender};
use crate::session::SessionState;

const RULE: &str = "────────────────────────────────────────";

/// Render whichever screen the session is on
#[must_use]
pub fn render(state: &SessionState) -> String {
    if !state.age_verified() {
        return age_gate();
    }
    match state.current_page() {
        Page::Gallery => gallery(state),
        Page::Chat => chat(state),
        Page::Subscription => subscription(),
        Page::Profile => profile(state),
    }
}

/// Adults-only confirmation
#[must_use]
pub fn age_gate() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}\n  AI ROMANCE\n{RULE}");
    let _ = writeln!(
        out,
        "This app contains mature content intended for adults only."
    );
    let _ = writeln!(out, "Type /yes to confirm you are 18 or older.");
    let _ = writeln!(out, "By continuing you accept the terms of use.");
    out
}

/// Every card, the active one expanded, plus position dots
#[must_use]
pub fn gallery(state: &SessionState) -> String {
    let mut out = String::new();
    let carousel = state.carousel();
    let _ = writeln!(out, "{RULE}\n  Choose your companion\n{RULE}");

    for (index, character) in state.catalog().characters().iter().enumerate() {
        if index == carousel.active() {
            let _ = writeln!(out, "▶ {}, {}", character.name, character.age);
            let _ = writeln!(out, "    {}", character.description);
            let _ = writeln!(out, "    {}", character.personality);
            let _ = writeln!(out, "    [/start] Start chatting");
        } else {
            let _ = writeln!(out, "  {}, {}", character.name, character.age);
        }
    }

    let dots: String = (0..carousel.len())
        .map(|i| if i == carousel.active() { '●' } else { '○' })
        .collect();
    let _ = writeln!(out, "\n  {dots}   /prev /next /go <n> /profile");
    out
}

/// Conversation with the selected character; empty when none is selected
#[must_use]
pub fn chat(state: &SessionState) -> String {
    let mut out = String::new();
    let Some(character) = state.selected_character() else {
        return out;
    };

    let badge = if state.has_subscription() {
        "Premium".to_string()
    } else {
        format!("{} free", state.free_messages_left())
    };
    let _ = writeln!(out, "{RULE}\n  {} · online   [{badge}]\n{RULE}", character.name);

    let mut messages = state.log().for_character(character.id).peekable();
    if messages.peek().is_none() {
        let _ = writeln!(out, "  Start a conversation with {}", character.name);
        let _ = writeln!(out, "  {}", character.personality);
    }
    for message in messages {
        let who = match message.sender {
            Sender::User => "You",
            Sender::Ai => character.name.as_str(),
        };
        let _ = writeln!(out, "  [{}] {who}: {}", message.time_label(), message.text);
    }

    if state.pending_request(character.id).is_some() {
        let _ = writeln!(out, "  {} is typing...", character.name);
    }
    let _ = writeln!(out, "\n  Write to {}... (/back /premium /profile)", character.name);
    out
}

/// Plan list with prices and features
#[must_use]
pub fn subscription() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}\n  Premium access\n{RULE}");
    let _ = writeln!(out, "Pick a plan and chat without limits.");
    for plan in PLANS {
        let popular = if plan.popular { "  ★ POPULAR" } else { "" };
        let _ = writeln!(out, "\n  {} — {} ₽{popular}", plan.name, plan.price_rub);
        for feature in plan.features {
            let _ = writeln!(out, "    ✓ {feature}");
        }
        let _ = writeln!(out, "    [/subscribe {}]", plan.id);
    }
    let _ = writeln!(out, "\n  Secure payment · Privacy · Instant activation   /back");
    out
}

/// Subscription status and conversation history
#[must_use]
pub fn profile(state: &SessionState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}\n  My profile\n{RULE}");

    match state.plan() {
        Some(plan) if state.has_subscription() => {
            let _ = writeln!(out, "  Premium subscription active ({})", plan.name);
        }
        _ => {
            let _ = writeln!(out, "  Free access · {} messages left   [/premium]", state.free_messages_left());
        }
    }

    let history = chat_history(state.catalog(), state.log());
    let _ = writeln!(out, "\n  Conversations: {}", history.len());
    if history.is_empty() {
        let _ = writeln!(out, "  Start chatting to see your history here.   [/gallery]");
    }
    for entry in history {
        let _ = writeln!(
            out,
            "  [/open {}] {} · {} messages · {}",
            entry.character.id,
            entry.character.name,
            entry.message_count,
            entry.last_message.timestamp.format("%d %b %H:%M"),
        );
        let _ = writeln!(out, "      {}", entry.last_message.text);
    }
    out
}
