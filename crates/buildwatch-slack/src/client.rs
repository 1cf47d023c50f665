//! Slack Web API client.

use std::time::Duration;

use async_trait::async_trait;
use buildwatch_core::{DispatchError, NotificationSink};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, info};

/// Slack client authenticated with a bot token (xoxb-...).
pub struct SlackClient {
    client: reqwest::Client,
    api_url: String,
    bot_token: SecretString,
}

impl SlackClient {
    pub fn new(api_url: &str, bot_token: SecretString, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token,
        })
    }

    /// Check the bot token, returning the bot's user ID.
    pub async fn auth_test(&self) -> Result<String, DispatchError> {
        let response = self.api_call("auth.test", &json!({})).await?;

        let user_id = response
            .get("user_id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        info!(user_id = %user_id, "Authenticated with Slack");
        Ok(user_id)
    }

    /// Call a Web API method and check the `ok` flag of the response.
    async fn api_call(&self, method: &str, payload: &Value) -> Result<Value, DispatchError> {
        let url = format!("{}/{}", self.api_url, method);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bot_token.expose_secret())
            .header("Content-Type", "application/json; charset=utf-8")
            .json(payload)
            .send()
            .await
            .map_err(|e| DispatchError::Request(e.to_string()))?;

        if response.status() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(30);
            return Err(DispatchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Request(format!("{}: {}", status, body)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DispatchError::Request(e.to_string()))?;

        if body.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let error = body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown");
            return Err(DispatchError::Rejected(error.to_string()));
        }

        Ok(body)
    }
}

#[async_trait]
impl NotificationSink for SlackClient {
    async fn post(&self, channel: &str, text: &str) -> Result<(), DispatchError> {
        self.api_call(
            "chat.postMessage",
            &json!({
                "channel": channel,
                "text": text,
            }),
        )
        .await?;

        debug!(channel = %channel, "Posted Slack message");
        Ok(())
    }
}
