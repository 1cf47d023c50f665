//! Handlers for slash commands and mentions.
//!
//! These are independent of the build monitor: they use the CI server and
//! notification sink directly and never touch tracker state.

use std::sync::Arc;

use buildwatch_core::{CiServer, NotificationSink, TriggerError};
use buildwatch_slack::SlashCommand;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Immediate reply to a build command.
pub const ACK_TEXT: &str = "Received your build request!";

/// A request to trigger builds, decoded from a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Channel replies are posted to.
    pub channel: String,
    /// Display name of the invoking user.
    pub user_name: String,
    /// Job named in the command text, if any.
    pub job: Option<String>,
}

impl From<&SlashCommand> for BuildRequest {
    fn from(command: &SlashCommand) -> Self {
        Self {
            channel: command.channel_id.clone(),
            user_name: command.display_name().to_string(),
            job: command.text.split_whitespace().next().map(str::to_string),
        }
    }
}

/// Which jobs a build request triggered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TriggerSummary {
    pub triggered: Vec<String>,
    pub failed: Vec<String>,
    /// No job could be resolved, so nothing was attempted.
    pub no_jobs: bool,
}

pub struct CommandHandler {
    ci: Arc<dyn CiServer>,
    sink: Arc<dyn NotificationSink>,
    default_job: Option<String>,
}

impl CommandHandler {
    pub fn new(
        ci: Arc<dyn CiServer>,
        sink: Arc<dyn NotificationSink>,
        default_job: Option<String>,
    ) -> Self {
        Self {
            ci,
            sink,
            default_job,
        }
    }

    /// Greet a user who mentioned the bot.
    pub async fn handle_mention(&self, channel: &str, user: &str) {
        let text = format!(
            "Hi <@{}>! I automatically post Jenkins job statuses here.",
            user
        );
        self.say(channel, &text).await;
    }

    /// Trigger builds for a command.
    ///
    /// `ack` receives the acknowledgment before any request reaches the CI
    /// server. Every failure is reported in the channel; nothing is returned
    /// as an error.
    pub async fn handle_build(
        &self,
        request: BuildRequest,
        ack: oneshot::Sender<String>,
    ) -> TriggerSummary {
        if ack.send(ACK_TEXT.to_string()).is_err() {
            debug!("Build command acknowledgment was not awaited");
        }

        self.say(
            &request.channel,
            &format!(
                "Hi @{}, your Jenkins build request has been received.",
                request.user_name
            ),
        )
        .await;

        let mut summary = TriggerSummary::default();

        let targets = self.resolve_targets(&request).await;
        if targets.is_empty() {
            self.say(&request.channel, "⚠️ No Jenkins jobs found.").await;
            summary.no_jobs = true;
            return summary;
        }

        for job in targets {
            match self.ci.trigger_build(&job).await {
                Ok(()) => {
                    self.say(
                        &request.channel,
                        &format!("✅ Jenkins job *{}* has been triggered successfully!", job),
                    )
                    .await;
                    summary.triggered.push(job);
                }
                Err(e) => {
                    warn!(job = %job, error = %e, "Failed to trigger build");
                    self.say(&request.channel, &trigger_failure_message(&job, &e))
                        .await;
                    summary.failed.push(job);
                }
            }
        }

        info!(
            user = %request.user_name,
            triggered = summary.triggered.len(),
            failed = summary.failed.len(),
            "Handled build command"
        );
        summary
    }

    async fn resolve_targets(&self, request: &BuildRequest) -> Vec<String> {
        if let Some(job) = request.job.as_ref().or(self.default_job.as_ref()) {
            return vec![job.clone()];
        }

        match self.ci.list_jobs().await {
            Ok(jobs) => jobs.into_iter().map(|job| job.name).collect(),
            Err(e) => {
                warn!(error = %e, "Failed to fetch jobs for build command");
                Vec::new()
            }
        }
    }

    async fn say(&self, channel: &str, text: &str) {
        if let Err(e) = self.sink.post(channel, text).await {
            warn!(channel = %channel, error = %e, "Failed to post reply");
        }
    }
}

fn trigger_failure_message(job: &str, err: &TriggerError) -> String {
    match err {
        TriggerError::Rejected { status } => format!(
            "⚠️ Failed to trigger Jenkins job: *{}*. Status code: {}",
            job, status
        ),
        TriggerError::Request(e) => format!(
            "⚠️ Failed to trigger Jenkins job: *{}*. Error: {}",
            job, e
        ),
    }
}
