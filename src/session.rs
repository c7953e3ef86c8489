//! Session state and the reducer that owns every mutation.
//!
//! Screens never touch state directly: they emit [`Action`]s, [`SessionState::reduce`]
//! applies them and hands back the [`Effect`]s the async driver must run. Reply
//! completions come back in as [`Action::ReplyResolved`], so the log, the quota
//! and navigation all change on a single path.

use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::catalog::{self, Catalog};
use crate::gallery::Carousel;
use crate::message_log::MessageLog;
use crate::metrics::SessionMetrics;
use crate::models::{Character, CharacterId, Page, Plan, RequestId, Sender};
use crate::reply::{ReplyRequest, FALLBACK_REPLY};
use crate::validation::InputValidator;

/// Source of message timestamps
pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Carousel intents, only honoured on the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryAction {
    /// Advance one card
    Next,
    /// Step back one card
    Prev,
    /// Show the card at this index
    Jump(usize),
    /// Open a chat with the active card's character
    StartChat,
}

/// How a reply request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The resolver produced text
    Delivered(String),
    /// The resolver failed; the reason is only logged
    Failed(String),
}

/// Intents emitted by screens and by the reply driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Confirm the user is an adult; cannot be undone
    VerifyAge,
    /// Go straight to a page
    Navigate(Page),
    /// Leave the current page
    Back,
    /// Open a chat with a character
    SelectCharacter(CharacterId),
    /// Carousel intent
    Gallery(GalleryAction),
    /// Send text to the selected character
    SendMessage(String),
    /// Activate a plan by id
    Subscribe(String),
    /// Resume a conversation from the profile
    OpenHistory(CharacterId),
    /// A reply task finished
    ReplyResolved {
        /// Token of the finished request
        request: RequestId,
        /// Character the reply belongs to
        character_id: CharacterId,
        /// Reply text or failure reason
        outcome: ReplyOutcome,
        /// Time spent resolving
        elapsed: Duration,
    },
}

/// Work the driver performs on behalf of the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start resolving a reply for the given request
    ResolveReply(ReplyRequest),
    /// Abandon an in-flight request
    CancelReply(RequestId),
}

/// Limits applied to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Free messages before the paywall
    pub free_message_quota: u32,
    /// Longest accepted message, in characters
    pub max_message_length: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            free_message_quota: 10,
            max_message_length: 2000,
        }
    }
}

/// Everything the screens render, plus the bookkeeping for pending replies
pub struct SessionState {
    catalog: Catalog,
    log: MessageLog,
    age_verified: bool,
    current_page: Page,
    selected: Option<CharacterId>,
    free_messages_left: u32,
    has_subscription: bool,
    plan: Option<&'static Plan>,
    carousel: Carousel,
    pending: HashMap<CharacterId, RequestId>,
    next_request: u64,
    max_message_length: usize,
    metrics: SessionMetrics,
    clock: Box<dyn Clock>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Catalog::default(), SessionLimits::default())
    }
}

impl SessionState {
    /// Fresh session behind the age gate, on the gallery
    #[must_use]
    pub fn new(catalog: Catalog, limits: SessionLimits) -> Self {
        let carousel = Carousel::new(catalog.len());
        Self {
            catalog,
            log: MessageLog::new(),
            age_verified: false,
            current_page: Page::Gallery,
            selected: None,
            free_messages_left: limits.free_message_quota,
            has_subscription: false,
            plan: None,
            carousel,
            pending: HashMap::new(),
            next_request: 1,
            max_message_length: limits.max_message_length,
            metrics: SessionMetrics::default(),
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the timestamp source
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Characters on offer
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Every message of the session
    pub const fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Whether the age gate has been passed
    pub const fn age_verified(&self) -> bool {
        self.age_verified
    }

    /// Page on screen
    pub const fn current_page(&self) -> Page {
        self.current_page
    }

    /// Character whose chat is open or was last open
    pub fn selected_character(&self) -> Option<&Character> {
        self.selected.and_then(|id| self.catalog.get(id))
    }

    /// Remaining free messages
    pub const fn free_messages_left(&self) -> u32 {
        self.free_messages_left
    }

    /// Whether a plan has been activated
    pub const fn has_subscription(&self) -> bool {
        self.has_subscription
    }

    /// Active plan, if any
    pub const fn plan(&self) -> Option<&'static Plan> {
        self.plan
    }

    /// Gallery carousel position
    pub const fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    /// Counters for this session
    pub const fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Request currently awaited for a character, if any
    pub fn pending_request(&self, character_id: CharacterId) -> Option<RequestId> {
        self.pending.get(&character_id).copied()
    }

    /// True when a reply is still expected for any character
    pub fn has_pending_replies(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Apply one intent and return the effects to run
    pub fn reduce(&mut self, action: Action) -> Vec<Effect> {
        if !self.age_verified && action != Action::VerifyAge {
            debug!(?action, "Ignoring intent behind the age gate");
            return Vec::new();
        }

        match action {
            Action::VerifyAge => {
                if !self.age_verified {
                    info!("Age confirmed");
                    self.age_verified = true;
                }
                Vec::new()
            }
            Action::Navigate(page) => self.navigate(page),
            Action::Back => self.back(),
            Action::SelectCharacter(id) | Action::OpenHistory(id) => self.open_chat(id),
            Action::Gallery(intent) => self.gallery(intent),
            Action::SendMessage(text) => self.send_message(&text),
            Action::Subscribe(plan_id) => self.subscribe(&plan_id),
            Action::ReplyResolved {
                request,
                character_id,
                outcome,
                elapsed,
            } => {
                self.reply_resolved(request, character_id, outcome, elapsed);
                Vec::new()
            }
        }
    }

    fn navigate(&mut self, page: Page) -> Vec<Effect> {
        if page == Page::Chat && self.selected.is_none() {
            debug!("Ignoring navigation to chat without a selected character");
            return Vec::new();
        }
        self.transition(page, self.selected)
    }

    fn back(&mut self) -> Vec<Effect> {
        let target = match self.current_page {
            Page::Subscription if self.selected.is_some() => Page::Chat,
            Page::Gallery | Page::Chat | Page::Subscription | Page::Profile => Page::Gallery,
        };
        self.transition(target, self.selected)
    }

    fn open_chat(&mut self, id: CharacterId) -> Vec<Effect> {
        if self.catalog.get(id).is_none() {
            warn!(character_id = id, "Ignoring unknown character");
            return Vec::new();
        }
        self.transition(Page::Chat, Some(id))
    }

    fn gallery(&mut self, intent: GalleryAction) -> Vec<Effect> {
        if self.current_page != Page::Gallery {
            debug!(?intent, page = %self.current_page, "Carousel intent outside the gallery");
            return Vec::new();
        }

        match intent {
            GalleryAction::Next => {
                self.carousel.next();
            }
            GalleryAction::Prev => {
                self.carousel.prev();
            }
            GalleryAction::Jump(index) => {
                if !self.carousel.jump(index) {
                    debug!(index, "Carousel index out of range");
                }
            }
            GalleryAction::StartChat => {
                if let Some(id) = self.catalog.at(self.carousel.active()).map(|c| c.id) {
                    return self.open_chat(id);
                }
            }
        }
        Vec::new()
    }

    /// Move to `page` with `selected`, cancelling the reply of a chat being left
    fn transition(&mut self, page: Page, selected: Option<CharacterId>) -> Vec<Effect> {
        let mut effects = Vec::new();

        if self.current_page == Page::Chat {
            if let Some(leaving) = self.selected {
                if page != Page::Chat || selected != Some(leaving) {
                    if let Some(request) = self.pending.remove(&leaving) {
                        debug!(character_id = leaving, %request, "Left chat, cancelling reply");
                        effects.push(Effect::CancelReply(request));
                    }
                }
            }
        }

        if page == Page::Gallery && self.current_page != Page::Gallery {
            self.carousel.reset();
        }

        debug!(from = %self.current_page, to = %page, ?selected, "Navigate");
        self.current_page = page;
        self.selected = selected;
        effects
    }

    fn send_message(&mut self, text: &str) -> Vec<Effect> {
        let Some(character_id) = self.selected else {
            debug!("Ignoring message without a selected character");
            return Vec::new();
        };
        if self.current_page != Page::Chat {
            debug!(page = %self.current_page, "Ignoring message outside the chat");
            return Vec::new();
        }

        let text = match InputValidator::validate_message_text(text, self.max_message_length) {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "Rejected message text");
                return Vec::new();
            }
        };

        if self.free_messages_left == 0 && !self.has_subscription {
            info!(character_id, "Free messages exhausted, redirecting to subscription");
            self.metrics.record_paywall_redirect();
            // The dropped send supersedes nothing: a reply already paid for stays pending
            self.current_page = Page::Subscription;
            return Vec::new();
        }

        let now = self.clock.now();
        self.log.append(character_id, text.clone(), Sender::User, now);
        if !self.has_subscription {
            self.free_messages_left = self.free_messages_left.saturating_sub(1);
        }
        self.metrics
            .record_message_sent(character_id, self.free_messages_left);

        let mut effects = Vec::new();
        if let Some(superseded) = self.pending.remove(&character_id) {
            debug!(character_id, request = %superseded, "Newer message supersedes pending reply");
            effects.push(Effect::CancelReply(superseded));
        }

        let request = RequestId(self.next_request);
        self.next_request += 1;
        self.pending.insert(character_id, request);
        effects.push(Effect::ResolveReply(ReplyRequest {
            id: request,
            character_id,
            text,
        }));
        effects
    }

    fn subscribe(&mut self, plan_id: &str) -> Vec<Effect> {
        let Some(plan) = catalog::plan(plan_id) else {
            warn!(plan_id, "Ignoring unknown plan");
            return Vec::new();
        };

        info!(plan = plan.id, "Subscription activated");
        self.has_subscription = true;
        self.plan = Some(plan);

        let target = if self.selected.is_some() {
            Page::Chat
        } else {
            Page::Gallery
        };
        self.transition(target, self.selected)
    }

    fn reply_resolved(
        &mut self,
        request: RequestId,
        character_id: CharacterId,
        outcome: ReplyOutcome,
        elapsed: Duration,
    ) {
        if self.pending.get(&character_id) != Some(&request) {
            debug!(character_id, %request, "Discarding stale reply");
            self.metrics.record_stale_reply();
            return;
        }
        self.pending.remove(&character_id);

        let (text, success) = match outcome {
            ReplyOutcome::Delivered(text) => (text, true),
            ReplyOutcome::Failed(reason) => {
                warn!(character_id, %request, %reason, "Reply failed, using fallback");
                (FALLBACK_REPLY.to_string(), false)
            }
        };

        let now = self.clock.now();
        self.log.append(character_id, text, Sender::Ai, now);
        self.metrics.record_reply(elapsed, success);
    }
}
