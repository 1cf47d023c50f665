//! Poll command: run the build monitor with stdout as the channel.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use buildwatch_core::{DispatchError, NotificationSink};
use buildwatch_tracker::{Poller, request_shutdown};
use tokio::sync::broadcast;

/// Prints notifications instead of posting them.
struct StdoutSink;

#[async_trait]
impl NotificationSink for StdoutSink {
    async fn post(&self, channel: &str, text: &str) -> Result<(), DispatchError> {
        println!("{}", render(channel, text));
        Ok(())
    }
}

fn render(channel: &str, text: &str) -> String {
    format!("[#{}] {}", channel, text)
}

pub async fn run(config: Option<&Path>, once: bool) -> Result<()> {
    let config = super::load(config)?;
    let jenkins = super::jenkins(&config)?;

    let mut poller = Poller::new(
        Arc::new(jenkins),
        Arc::new(StdoutSink),
        config.slack.channel.clone(),
        config.poll_interval,
    );

    if once {
        let report = poller.poll_once().await;
        if !report.fetched {
            anyhow::bail!("failed to fetch jobs from Jenkins");
        }
        println!(
            "{} jobs, {} notifications",
            report.jobs, report.dispatched
        );
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let monitor = tokio::spawn(poller.run(shutdown_rx));
    tokio::signal::ctrl_c().await?;
    request_shutdown(&shutdown_tx);
    monitor.await?;
    Ok(())
}
