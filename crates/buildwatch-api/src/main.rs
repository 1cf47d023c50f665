//! BuildWatch server: Jenkins build monitor plus Slack endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use buildwatch_api::{AppState, CommandHandler, routes};
use buildwatch_config::BotConfig;
use buildwatch_jenkins::JenkinsClient;
use buildwatch_slack::SlackClient;
use buildwatch_tracker::{Poller, request_shutdown};
use clap::{Parser, ValueEnum};
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "buildwatch-server")]
#[command(about = "Posts Jenkins build status to Slack", long_about = None)]
struct Args {
    /// Path to a KDL configuration file
    #[arg(long, env = "BUILDWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let config = buildwatch_config::load(args.config.as_deref())
        .context("failed to load configuration")?;
    run(config).await
}

async fn run(config: BotConfig) -> anyhow::Result<()> {
    let jenkins = JenkinsClient::new(
        config.jenkins.url.as_str(),
        config.jenkins.user.clone(),
        config.jenkins.api_token.clone(),
        config.http_timeout,
    )
    .context("failed to build Jenkins client")?;
    info!(url = %jenkins.base_url(), "Jenkins client ready");

    let slack = SlackClient::new(
        &config.slack.api_url,
        config.slack.bot_token.clone(),
        config.http_timeout,
    )
    .context("failed to build Slack client")?;
    if let Err(e) = slack.auth_test().await {
        warn!(error = %e, "Slack token check failed; messages may not be delivered");
    }

    if config
        .slack
        .signing_secret
        .as_ref()
        .is_none_or(|s| s.expose_secret().is_empty())
    {
        warn!("No Slack signing secret configured; inbound requests are not verified");
    }

    let ci = Arc::new(jenkins);
    let sink = Arc::new(slack);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let poller = Poller::new(
        ci.clone(),
        sink.clone(),
        config.slack.channel.clone(),
        config.poll_interval,
    );
    let monitor = tokio::spawn(poller.run(shutdown_rx));

    let handler = CommandHandler::new(ci, sink, config.build_job.clone());
    let state = AppState::new(handler, config.slack.signing_secret.clone());
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    info!("Starting server on {}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutting down");
    request_shutdown(&shutdown_tx);
    monitor.await.context("build monitor task failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
