//! Async driver around the session reducer.
//!
//! [`SessionStore`] is the single owner of [`SessionState`]. It runs the
//! reducer's effects: each reply request becomes a tokio task with its own
//! [`CancellationToken`], and the task's result is fed back through a channel
//! as [`Action::ReplyResolved`] so it is applied like any other intent.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CompanionError;
use crate::logging::OperationTimer;
use crate::models::RequestId;
use crate::reply::{ReplyRequest, ReplyResolver};
use crate::session::{Action, Effect, ReplyOutcome, SessionState};

/// Owns the session state and the reply tasks it spawned
pub struct SessionStore {
    state: SessionState,
    resolver: Arc<dyn ReplyResolver>,
    in_flight: HashMap<RequestId, CancellationToken>,
    completions_tx: mpsc::UnboundedSender<Action>,
    completions_rx: mpsc::UnboundedReceiver<Action>,
}

impl SessionStore {
    /// Drive `state`, resolving replies with `resolver`
    pub fn new(state: SessionState, resolver: Arc<dyn ReplyResolver>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            state,
            resolver,
            in_flight: HashMap::new(),
            completions_tx,
            completions_rx,
        }
    }

    /// Current session state
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Number of reply tasks that have not reported back or been cancelled
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Apply an intent and start whatever work it requires.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, action: Action) {
        if let Action::ReplyResolved { request, .. } = &action {
            self.in_flight.remove(request);
        }

        for effect in self.state.reduce(action) {
            match effect {
                Effect::ResolveReply(request) => self.spawn_reply(request),
                Effect::CancelReply(request) => {
                    if let Some(token) = self.in_flight.remove(&request) {
                        debug!(%request, "Cancelling reply task");
                        token.cancel();
                    }
                }
            }
        }
    }

    /// Wait for the next reply completion and apply it.
    ///
    /// Returns `false` when there is nothing left to wait for.
    pub async fn next_completion(&mut self) -> bool {
        if !self.state.has_pending_replies() {
            return false;
        }
        match self.completions_rx.recv().await {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// Apply every completion that has already arrived, without waiting
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.completions_rx.try_recv() {
            self.dispatch(action);
            applied += 1;
        }
        applied
    }

    /// Wait until no reply is pending for any character
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    /// Cancel every outstanding reply task
    pub fn shutdown(&mut self) {
        for (request, token) in self.in_flight.drain() {
            debug!(%request, "Cancelling reply task on shutdown");
            token.cancel();
        }
    }

    fn spawn_reply(&mut self, request: ReplyRequest) {
        let token = CancellationToken::new();
        self.in_flight.insert(request.id, token.clone());

        let resolver = Arc::clone(&self.resolver);
        let tx = self.completions_tx.clone();
        debug!(request = %request.id, character_id = request.character_id, resolver = resolver.name(), "Resolving reply");

        tokio::spawn(async move {
            let timer = OperationTimer::new("resolve_reply");
            let result = resolver.resolve(&request, token).await;
            let elapsed = timer.elapsed();
            timer.finish();

            let outcome = match result {
                Ok(text) => ReplyOutcome::Delivered(text),
                Err(CompanionError::Cancelled(_)) => return,
                Err(e) => ReplyOutcome::Failed(e.to_string()),
            };

            let completion = Action::ReplyResolved {
                request: request.id,
                character_id: request.character_id,
                outcome,
                elapsed,
            };
            if tx.send(completion).is_err() {
                debug!(request = %request.id, "Session closed before reply arrived");
            }
        });
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}
