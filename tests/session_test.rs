//! Reducer tests: navigation, quota, paywall and reply bookkeeping

use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use companion_chat::catalog::Catalog;
use companion_chat::models::{Page, RequestId, Sender};
use companion_chat::reply::FALLBACK_REPLY;
use companion_chat::session::{
    Action, Clock, Effect, GalleryAction, ReplyOutcome, SessionLimits, SessionState,
};

/// Clock that advances one minute per reading
#[derive(Clone)]
struct SteppingClock {
    base: DateTime<Local>,
    ticks: Arc<AtomicI64>,
}

impl SteppingClock {
    fn new() -> Self {
        Self {
            base: Local::now(),
            ticks: Arc::new(AtomicI64::new(0)),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Local> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.base + ChronoDuration::minutes(tick)
    }
}

fn session() -> SessionState {
    let mut state = SessionState::default().with_clock(SteppingClock::new());
    state.reduce(Action::VerifyAge);
    state
}

fn chatting_with(id: u32) -> SessionState {
    let mut state = session();
    state.reduce(Action::SelectCharacter(id));
    state
}

fn resolve_request(effects: &[Effect]) -> RequestId {
    effects
        .iter()
        .find_map(|e| match e {
            Effect::ResolveReply(req) => Some(req.id),
            Effect::CancelReply(_) => None,
        })
        .expect("send should request a reply")
}

fn deliver(state: &mut SessionState, request: RequestId, character_id: u32, text: &str) {
    state.reduce(Action::ReplyResolved {
        request,
        character_id,
        outcome: ReplyOutcome::Delivered(text.to_string()),
        elapsed: Duration::from_millis(5),
    });
}

#[test]
fn test_initial_state() {
    let state = SessionState::default();
    assert!(!state.age_verified());
    assert_eq!(state.current_page(), Page::Gallery);
    assert!(state.selected_character().is_none());
    assert_eq!(state.free_messages_left(), 10);
    assert!(!state.has_subscription());
}

#[test]
fn test_intents_ignored_behind_age_gate() {
    let mut state = SessionState::default();
    state.reduce(Action::SelectCharacter(1));
    state.reduce(Action::Navigate(Page::Profile));
    assert_eq!(state.current_page(), Page::Gallery);
    assert!(state.selected_character().is_none());

    state.reduce(Action::VerifyAge);
    assert!(state.age_verified());
    state.reduce(Action::VerifyAge);
    assert!(state.age_verified());
}

#[test]
fn test_select_character_opens_chat() {
    let state = chatting_with(2);
    assert_eq!(state.current_page(), Page::Chat);
    assert_eq!(state.selected_character().map(|c| c.id), Some(2));
}

#[test]
fn test_unknown_character_is_ignored() {
    let mut state = session();
    state.reduce(Action::SelectCharacter(42));
    assert_eq!(state.current_page(), Page::Gallery);
    assert!(state.selected_character().is_none());
}

#[test]
fn test_navigate_to_chat_requires_selection() {
    let mut state = session();
    state.reduce(Action::Navigate(Page::Chat));
    assert_eq!(state.current_page(), Page::Gallery);
}

#[test]
fn test_back_from_subscription_depends_on_selection() {
    let mut state = session();
    state.reduce(Action::Navigate(Page::Subscription));
    state.reduce(Action::Back);
    assert_eq!(state.current_page(), Page::Gallery);

    let mut state = chatting_with(1);
    state.reduce(Action::Navigate(Page::Subscription));
    state.reduce(Action::Back);
    assert_eq!(state.current_page(), Page::Chat);
}

#[test]
fn test_back_from_chat_and_profile_goes_to_gallery() {
    let mut state = chatting_with(1);
    state.reduce(Action::Back);
    assert_eq!(state.current_page(), Page::Gallery);

    state.reduce(Action::Navigate(Page::Profile));
    state.reduce(Action::Back);
    assert_eq!(state.current_page(), Page::Gallery);
}

#[test]
fn test_send_appends_user_message_and_decrements_quota() {
    let mut state = chatting_with(1);
    let effects = state.reduce(Action::SendMessage("  Hi  ".to_string()));

    assert_eq!(state.log().len(), 1);
    let message = &state.log().all()[0];
    assert_eq!(message.text, "Hi");
    assert_eq!(message.sender, Sender::User);
    assert_eq!(message.character_id, 1);
    assert_eq!(state.free_messages_left(), 9);

    let request = resolve_request(&effects);
    assert_eq!(state.pending_request(1), Some(request));

    deliver(&mut state, request, 1, "Hello you");
    assert_eq!(state.log().len(), 2);
    assert_eq!(state.log().all()[1].sender, Sender::Ai);
    assert!(!state.has_pending_replies());
}

#[test]
fn test_blank_message_is_not_sent() {
    let mut state = chatting_with(1);
    let effects = state.reduce(Action::SendMessage("   ".to_string()));
    assert!(effects.is_empty());
    assert!(state.log().is_empty());
    assert_eq!(state.free_messages_left(), 10);
}

#[test]
fn test_eleventh_free_message_redirects_to_paywall() {
    let mut state = chatting_with(1);
    for i in 0..10 {
        state.reduce(Action::SendMessage(format!("message {i}")));
    }
    assert_eq!(state.free_messages_left(), 0);
    assert_eq!(state.log().len(), 10);

    let effects = state.reduce(Action::SendMessage("Hi".to_string()));
    assert_eq!(state.current_page(), Page::Subscription);
    assert_eq!(state.log().len(), 10);
    assert_eq!(state.free_messages_left(), 0);
    assert!(!effects
        .iter()
        .any(|e| matches!(e, Effect::ResolveReply(_))));
    assert_eq!(state.metrics().paywall_redirects, 1);
}

#[test]
fn test_paywall_redirect_keeps_last_paid_reply_pending() {
    let mut state = chatting_with(1);
    for i in 0..9 {
        let effects = state.reduce(Action::SendMessage(format!("message {i}")));
        deliver(&mut state, resolve_request(&effects), 1, "ok");
    }
    let effects = state.reduce(Action::SendMessage("tenth".to_string()));
    let tenth = resolve_request(&effects);

    let effects = state.reduce(Action::SendMessage("eleventh".to_string()));
    assert!(effects.is_empty());
    assert_eq!(state.current_page(), Page::Subscription);
    assert_eq!(state.pending_request(1), Some(tenth));

    deliver(&mut state, tenth, 1, "worth it");
    assert_eq!(state.log().latest_for(1).map(|m| m.text.as_str()), Some("worth it"));
    assert_eq!(state.metrics().stale_replies, 0);
}

#[test]
fn test_subscription_lifts_quota() {
    let mut state = chatting_with(3);
    for _ in 0..10 {
        state.reduce(Action::SendMessage("hey".to_string()));
    }
    state.reduce(Action::SendMessage("hey".to_string()));
    assert_eq!(state.current_page(), Page::Subscription);

    state.reduce(Action::Subscribe("intimate".to_string()));
    assert!(state.has_subscription());
    assert_eq!(state.plan().map(|p| p.id), Some("intimate"));
    assert_eq!(state.current_page(), Page::Chat);

    state.reduce(Action::SendMessage("still here".to_string()));
    assert_eq!(state.free_messages_left(), 0);
    assert_eq!(state.log().len(), 11);
}

#[test]
fn test_subscribed_sends_never_decrement() {
    let mut state = chatting_with(1);
    state.reduce(Action::Subscribe("flirt".to_string()));
    for _ in 0..3 {
        state.reduce(Action::SendMessage("hey".to_string()));
    }
    assert_eq!(state.free_messages_left(), 10);
}

#[test]
fn test_subscribe_without_selection_returns_to_gallery() {
    let mut state = session();
    state.reduce(Action::Navigate(Page::Subscription));
    state.reduce(Action::Subscribe("flirt".to_string()));
    assert_eq!(state.current_page(), Page::Gallery);
    assert!(state.has_subscription());
}

#[test]
fn test_unknown_plan_is_ignored() {
    let mut state = session();
    state.reduce(Action::Navigate(Page::Subscription));
    state.reduce(Action::Subscribe("platinum".to_string()));
    assert!(!state.has_subscription());
    assert_eq!(state.current_page(), Page::Subscription);
}

#[test]
fn test_failed_reply_appends_fallback() {
    let mut state = chatting_with(1);
    let request = resolve_request(&state.reduce(Action::SendMessage("Hi".to_string())));
    state.reduce(Action::ReplyResolved {
        request,
        character_id: 1,
        outcome: ReplyOutcome::Failed("status 502".to_string()),
        elapsed: Duration::from_millis(5),
    });

    let last = state.log().all().last().map(|m| (m.text.clone(), m.sender));
    assert_eq!(last, Some((FALLBACK_REPLY.to_string(), Sender::Ai)));
    assert_eq!(state.metrics().replies_failed, 1);
}

#[test]
fn test_newer_send_supersedes_pending_reply() {
    let mut state = chatting_with(1);
    let first = resolve_request(&state.reduce(Action::SendMessage("one".to_string())));
    let effects = state.reduce(Action::SendMessage("two".to_string()));
    let second = resolve_request(&effects);

    assert!(effects.contains(&Effect::CancelReply(first)));
    assert_eq!(state.pending_request(1), Some(second));

    deliver(&mut state, first, 1, "late answer");
    assert_eq!(state.log().len(), 2);
    assert_eq!(state.metrics().stale_replies, 1);

    deliver(&mut state, second, 1, "fresh answer");
    assert_eq!(state.log().all().last().map(|m| m.text.as_str()), Some("fresh answer"));
}

#[test]
fn test_leaving_chat_cancels_pending_reply() {
    let mut state = chatting_with(1);
    let request = resolve_request(&state.reduce(Action::SendMessage("hi".to_string())));

    let effects = state.reduce(Action::Navigate(Page::Profile));
    assert_eq!(effects, vec![Effect::CancelReply(request)]);
    assert!(state.pending_request(1).is_none());

    deliver(&mut state, request, 1, "too late");
    assert_eq!(state.log().len(), 1);
}

#[test]
fn test_switching_character_keeps_other_pending_reply() {
    let mut state = chatting_with(1);
    let first = resolve_request(&state.reduce(Action::SendMessage("hi".to_string())));
    state.reduce(Action::Back);
    state.reduce(Action::SelectCharacter(2));
    let second = resolve_request(&state.reduce(Action::SendMessage("hello".to_string())));

    assert!(state.pending_request(1).is_none());
    assert_eq!(state.pending_request(2), Some(second));
    assert_ne!(first, second);
}

#[test]
fn test_gallery_intents_only_on_gallery() {
    let mut state = session();
    state.reduce(Action::Gallery(GalleryAction::Next));
    state.reduce(Action::Gallery(GalleryAction::Next));
    assert_eq!(state.carousel().active(), 2);

    state.reduce(Action::Gallery(GalleryAction::StartChat));
    assert_eq!(state.selected_character().map(|c| c.id), Some(3));

    state.reduce(Action::Gallery(GalleryAction::Next));
    assert_eq!(state.carousel().active(), 2);
}

#[test]
fn test_returning_to_gallery_resets_carousel() {
    let mut state = session();
    state.reduce(Action::Gallery(GalleryAction::Jump(3)));
    state.reduce(Action::Navigate(Page::Profile));
    state.reduce(Action::Navigate(Page::Gallery));
    assert_eq!(state.carousel().active(), 0);
}

#[test]
fn test_open_history_selects_and_opens_chat() {
    let mut state = session();
    state.reduce(Action::Navigate(Page::Profile));
    state.reduce(Action::OpenHistory(4));
    assert_eq!(state.current_page(), Page::Chat);
    assert_eq!(state.selected_character().map(|c| c.id), Some(4));
}

#[test]
fn test_custom_quota() {
    let limits = SessionLimits {
        free_message_quota: 1,
        max_message_length: 10,
    };
    let mut state = SessionState::new(Catalog::default(), limits);
    state.reduce(Action::VerifyAge);
    state.reduce(Action::SelectCharacter(1));

    state.reduce(Action::SendMessage("this one is far too long".to_string()));
    assert!(state.log().is_empty());

    state.reduce(Action::SendMessage("short".to_string()));
    state.reduce(Action::SendMessage("again".to_string()));
    assert_eq!(state.log().len(), 1);
    assert_eq!(state.current_page(), Page::Subscription);
}
