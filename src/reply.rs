//! Reply resolvers: where the persona's answer comes from.
//!
//! Two implementations share the [`ReplyResolver`] seam. [`CannedReplies`]
//! waits a fixed delay and picks one of five stock lines; [`RemoteReplies`]
//! makes a single POST to an external inference endpoint. Both observe a
//! [`CancellationToken`] so the session can abandon superseded requests.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CompanionError, Result};
use crate::models::{CharacterId, RequestId};
use crate::validation::InputValidator;

/// Appended in place of a reply when resolution fails
pub const FALLBACK_REPLY: &str =
    "Sorry, I can't answer right now... Try writing to me again in a moment 💔";

/// Everything a resolver needs to produce one reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    /// Token the session uses to match the completion
    pub id: RequestId,
    /// Persona being addressed
    pub character_id: CharacterId,
    /// The user's message
    pub text: String,
}

/// Produces the persona's reply to a user message
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplyResolver: Send + Sync {
    /// Resolve one reply, returning `Cancelled` if the token fires first
    async fn resolve(&self, request: &ReplyRequest, token: CancellationToken) -> Result<String>;

    /// Short label used in logs
    fn name(&self) -> &'static str;
}

/// The five stock replies for a given user message
#[must_use]
pub fn canned_replies(user_text: &str) -> [String; 5] {
    let remark = if user_text.chars().count() > 20 {
        "I like how talkative you are..."
    } else {
        ""
    };
    [
        format!("Hi there, handsome 😘 {remark}"),
        "Mmm, interesting... tell me more 💋".to_string(),
        "You're so bold 🔥 Go on...".to_string(),
        "Oh, you really know how to get my attention 😏".to_string(),
        "I want to get to know you better... much better 💕".to_string(),
    ]
}

/// Offline resolver: fixed delay, then a uniformly random stock line
#[derive(Debug, Clone)]
pub struct CannedReplies {
    delay: Duration,
}

impl CannedReplies {
    /// Reply after `delay`
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ReplyResolver for CannedReplies {
    async fn resolve(&self, request: &ReplyRequest, token: CancellationToken) -> Result<String> {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!(target: "reply::canned", request = %request.id, "Cancelled during delay");
                return Err(CompanionError::Cancelled(request.id.0));
            }
            () = tokio::time::sleep(self.delay) => {}
        }

        let mut replies = canned_replies(&request.text);
        let index = rand::thread_rng().gen_range(0..replies.len());
        Ok(std::mem::take(&mut replies[index]))
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyBody<'a> {
    character_id: CharacterId,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ReplyResponse {
    response: String,
}

/// Resolver backed by an external inference endpoint
#[derive(Debug, Clone)]
pub struct RemoteReplies {
    client: reqwest::Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl RemoteReplies {
    /// Client for `endpoint`; rejects anything that is not an http(s) URL
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = endpoint.into();
        InputValidator::validate_endpoint(&endpoint)
            .map_err(|e| CompanionError::InvalidConfig(e.to_string()))?;
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    async fn post(&self, request: &ReplyRequest) -> Result<String> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&ReplyBody {
                character_id: request.character_id,
                message: &request.text,
            });
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompanionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed: ReplyResponse = serde_json::from_str(&text)?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl ReplyResolver for RemoteReplies {
    async fn resolve(&self, request: &ReplyRequest, token: CancellationToken) -> Result<String> {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!(target: "reply::remote", request = %request.id, "Cancelled while awaiting endpoint");
                Err(CompanionError::Cancelled(request.id.0))
            }
            res = self.post(request) => res,
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
