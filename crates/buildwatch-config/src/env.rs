//! Environment variable overrides.

use crate::{ConfigError, ConfigResult, RawConfig};

/// Apply environment overrides on top of file settings.
///
/// `lookup` resolves a variable name; pass `|k| std::env::var(k).ok()` for the
/// process environment.
pub fn apply_overrides<F>(raw: &mut RawConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let set = |target: &mut Option<String>, key: &str| {
        if let Some(value) = lookup(key) {
            *target = Some(value);
        }
    };

    set(&mut raw.jenkins_url, "JENKINS_URL");
    set(&mut raw.jenkins_user, "JENKINS_USER");
    set(&mut raw.jenkins_api_token, "JENKINS_API_TOKEN");
    set(&mut raw.slack_bot_token, "SLACK_BOT_TOKEN");
    set(&mut raw.slack_signing_secret, "SLACK_SIGNING_SECRET");
    set(&mut raw.slack_channel, "DEFAULT_SLACK_CHANNEL");
    set(&mut raw.slack_api_url, "SLACK_API_URL");
    set(&mut raw.build_job, "BUILD_JOB");
    set(&mut raw.listen, "BUILDWATCH_LISTEN");

    if let Some(value) = lookup("POLL_INTERVAL") {
        raw.poll_interval_secs = Some(parse_secs("POLL_INTERVAL", &value)?);
    }
    if let Some(value) = lookup("HTTP_TIMEOUT") {
        raw.http_timeout_secs = Some(parse_secs("HTTP_TIMEOUT", &value)?);
    }

    Ok(())
}

fn parse_secs(key: &str, value: &str) -> ConfigResult<u64> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: key.to_string(),
        message: format!("expected a number of seconds, got {:?}", value),
    })
}
