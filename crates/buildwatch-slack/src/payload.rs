//! Inbound Slack payloads: slash commands and Events API callbacks.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A slash command invocation, sent form-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashCommand {
    /// The command, e.g. `/build`.
    pub command: String,
    /// Text after the command.
    pub text: String,
    pub user_id: String,
    /// Display name of the invoking user.
    pub user_name: String,
    /// Channel the command was invoked in.
    pub channel_id: String,
}

impl SlashCommand {
    /// Parse a form-encoded slash command body.
    pub fn from_form(body: &[u8]) -> Result<Self, PayloadError> {
        let mut fields: HashMap<String, String> = url::form_urlencoded::parse(body)
            .into_owned()
            .collect();

        let mut required = |name: &'static str| {
            fields
                .remove(name)
                .filter(|v| !v.is_empty())
                .ok_or(PayloadError::MissingField(name))
        };

        let command = required("command")?;
        let user_id = required("user_id")?;
        let channel_id = required("channel_id")?;

        Ok(Self {
            command,
            user_id,
            channel_id,
            text: fields.remove("text").unwrap_or_default(),
            user_name: fields.remove("user_name").unwrap_or_default(),
        })
    }

    /// Name to greet the invoker with, falling back to the user ID.
    pub fn display_name(&self) -> &str {
        if self.user_name.is_empty() {
            &self.user_id
        } else {
            &self.user_name
        }
    }
}

/// Outer envelope of an Events API request.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// Sent once when the request URL is configured.
    UrlVerification { challenge: String },
    /// A subscribed event.
    EventCallback {
        event: CallbackEvent,
        #[serde(default)]
        event_id: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl EventEnvelope {
    pub fn from_json(body: &[u8]) -> Result<Self, PayloadError> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Events this bot subscribes to.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    /// The bot was @mentioned in a channel.
    AppMention(AppMentionEvent),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppMentionEvent {
    /// User who mentioned the bot.
    pub user: String,
    /// Channel the mention was posted in.
    pub channel: String,
}
