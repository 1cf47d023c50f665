//! Resolved settings and their validation.

use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::{ConfigError, ConfigResult};

pub const DEFAULT_CHANNEL: &str = "cicd-status";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";

/// Fully validated configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub jenkins: JenkinsSettings,
    pub slack: SlackSettings,
    /// Delay between two poll cycles.
    pub poll_interval: Duration,
    /// Job triggered by the build command when none is named.
    pub build_job: Option<String>,
    /// Address the Slack endpoints listen on.
    pub listen: SocketAddr,
    /// Timeout applied to every outbound HTTP request.
    pub http_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct JenkinsSettings {
    /// Base URL without a trailing slash.
    pub url: Url,
    pub user: String,
    pub api_token: SecretString,
}

#[derive(Debug, Clone)]
pub struct SlackSettings {
    pub bot_token: SecretString,
    /// Used to verify inbound requests. Verification is skipped when absent.
    pub signing_secret: Option<SecretString>,
    /// Channel build notifications are posted to.
    pub channel: String,
    pub api_url: String,
}

/// Settings as collected from the file and environment, before validation.
#[derive(Debug, Default, Clone)]
pub struct RawConfig {
    pub jenkins_url: Option<String>,
    pub jenkins_user: Option<String>,
    pub jenkins_api_token: Option<String>,
    pub slack_bot_token: Option<String>,
    pub slack_signing_secret: Option<String>,
    pub slack_channel: Option<String>,
    pub slack_api_url: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub build_job: Option<String>,
    pub listen: Option<String>,
    pub http_timeout_secs: Option<u64>,
}

impl RawConfig {
    /// Validate and fill in defaults.
    pub fn build(self) -> ConfigResult<BotConfig> {
        let jenkins_url = self
            .jenkins_url
            .ok_or_else(|| ConfigError::MissingField("jenkins url".to_string()))?;
        let url = parse_base_url(&jenkins_url)?;

        let user = self
            .jenkins_user
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ConfigError::MissingField("jenkins user".to_string()))?;
        let api_token = self
            .jenkins_api_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingField("jenkins api-token".to_string()))?;
        let bot_token = self
            .slack_bot_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingField("slack bot-token".to_string()))?;

        let poll_interval_secs = self
            .poll_interval_secs
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        if poll_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "poll interval",
                "must be at least one second",
            ));
        }

        let http_timeout_secs = self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        if http_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "http timeout",
                "must be at least one second",
            ));
        }

        let listen = self.listen.as_deref().unwrap_or(DEFAULT_LISTEN);
        let listen: SocketAddr = listen
            .parse()
            .map_err(|e| ConfigError::invalid("server listen", format!("{listen}: {e}")))?;

        let api_url = self
            .slack_api_url
            .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(BotConfig {
            jenkins: JenkinsSettings {
                url,
                user,
                api_token: SecretString::from(api_token),
            },
            slack: SlackSettings {
                bot_token: SecretString::from(bot_token),
                signing_secret: self
                    .slack_signing_secret
                    .filter(|s| !s.is_empty())
                    .map(SecretString::from),
                channel: self
                    .slack_channel
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
                api_url,
            },
            poll_interval: Duration::from_secs(poll_interval_secs),
            build_job: self.build_job.filter(|j| !j.is_empty()),
            listen,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

fn parse_base_url(raw: &str) -> ConfigResult<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ConfigError::invalid("jenkins url", e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::invalid(
            "jenkins url",
            format!("unsupported scheme: {other}"),
        )),
    }
}
