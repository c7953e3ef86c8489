//! Companion Chat - Session Engine
//!
//! A Rust library for running a character companion chat session: an age
//! gate, a character carousel, per-character conversations with a free
//! message quota, a subscription paywall and a conversation history.
//!
//! # Features
//!
//! - Reducer-style session store with typed actions and effects
//! - Cancellable reply tasks keyed by request token
//! - Canned or remote (HTTP) reply resolvers
//! - Plain-text screen rendering for terminal front-ends

/// Fixed character catalog and plans
pub mod catalog;
/// Input line parsing for the terminal front-end
pub mod commands;
/// Configuration management
pub mod config;
/// Error types
pub mod error;
/// Gallery carousel
pub mod gallery;
/// Conversation history projection
pub mod history;
/// Logging setup and utilities
pub mod logging;
/// Append-only message log
pub mod message_log;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Reply resolvers
pub mod reply;
/// Screen rendering
pub mod screens;
/// Session state and reducer
pub mod session;
/// Async driver for reply effects
pub mod store;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use catalog::Catalog;
pub use error::{CompanionError, Result};
pub use models::{Character, Message, Page, Sender};
pub use session::{Action, Effect, SessionState};
pub use store::SessionStore;
