//! CLI command implementations.

pub mod jobs;
pub mod poll;

use std::path::Path;

use anyhow::{Context, Result};
use buildwatch_config::BotConfig;
use buildwatch_jenkins::JenkinsClient;

pub fn validate(path: &Path) -> Result<()> {
    let config = buildwatch_config::load(Some(path))
        .with_context(|| format!("configuration error in {}", path.display()))?;

    println!("Configuration is valid");
    println!("  jenkins:  {}", config.jenkins.url);
    println!("  channel:  {}", config.slack.channel);
    println!("  interval: {}s", config.poll_interval.as_secs());
    if let Some(job) = &config.build_job {
        println!("  build:    {}", job);
    }
    Ok(())
}

pub(crate) fn load(path: Option<&Path>) -> Result<BotConfig> {
    buildwatch_config::load(path).context("failed to load configuration")
}

pub(crate) fn jenkins(config: &BotConfig) -> Result<JenkinsClient> {
    JenkinsClient::new(
        config.jenkins.url.as_str(),
        config.jenkins.user.clone(),
        config.jenkins.api_token.clone(),
        config.http_timeout,
    )
    .context("failed to build Jenkins client")
}
