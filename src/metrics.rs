//! Session metrics.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Counter: user messages appended
pub const MESSAGES_SENT_TOTAL: &str = "companion_messages_sent_total";
/// Counter: replies appended, labelled by `outcome`
pub const REPLIES_TOTAL: &str = "companion_replies_total";
/// Histogram: reply resolution time
pub const REPLY_DURATION: &str = "companion_reply_duration_seconds";
/// Counter: sends redirected to the subscription page
pub const PAYWALL_REDIRECTS_TOTAL: &str = "companion_paywall_redirects_total";
/// Counter: completions discarded as stale
pub const STALE_REPLIES_TOTAL: &str = "companion_stale_replies_total";
/// Gauge: free messages remaining
pub const FREE_MESSAGES_LEFT: &str = "companion_free_messages_left";

/// Session counters, mirrored into the global `metrics` recorder.
///
/// Without an installed recorder the macro calls are no-ops; the local fields
/// keep a snapshot the profile screen and tests can read.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionMetrics {
    /// User messages appended
    pub messages_sent: u64,
    /// Replies delivered by the resolver
    pub replies_ok: u64,
    /// Replies replaced by the fallback
    pub replies_failed: u64,
    /// Sends turned into a paywall redirect
    pub paywall_redirects: u64,
    /// Completions that arrived for a request no longer pending
    pub stale_replies: u64,
}

impl SessionMetrics {
    /// Record a user message appended to the log
    pub fn record_message_sent(&mut self, character_id: u32, free_left: u32) {
        self.messages_sent += 1;
        counter!(MESSAGES_SENT_TOTAL, "character" => character_id.to_string()).increment(1);
        gauge!(FREE_MESSAGES_LEFT).set(f64::from(free_left));
    }

    /// Record a resolved reply, successful or replaced by the fallback
    pub fn record_reply(&mut self, duration: Duration, success: bool) {
        let outcome = if success {
            self.replies_ok += 1;
            "success"
        } else {
            self.replies_failed += 1;
            "fallback"
        };
        counter!(REPLIES_TOTAL, "outcome" => outcome).increment(1);
        histogram!(REPLY_DURATION, "outcome" => outcome).record(duration.as_secs_f64());
    }

    /// Record a send that was redirected to the paywall
    pub fn record_paywall_redirect(&mut self) {
        self.paywall_redirects += 1;
        counter!(PAYWALL_REDIRECTS_TOTAL).increment(1);
    }

    /// Record a reply discarded because its request was superseded
    pub fn record_stale_reply(&mut self) {
        self.stale_replies += 1;
        counter!(STALE_REPLIES_TOTAL).increment(1);
    }
}
