//! Slack integration for BuildWatch.
//!
//! - `SlackClient` posts messages through the Web API (`chat.postMessage`)
//! - `signature` verifies that inbound HTTP requests were sent by Slack
//! - `payload` parses slash commands and Events API callbacks

pub mod client;
pub mod payload;
pub mod signature;

pub use client::SlackClient;
pub use payload::{AppMentionEvent, CallbackEvent, EventEnvelope, PayloadError, SlashCommand};
pub use signature::{SignatureError, verify_signature};
