//! Poll loop that announces new builds.

use std::sync::Arc;
use std::time::Duration;

use buildwatch_core::{CiServer, NotificationSink};
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::message::format_event;
use crate::tracker::JobStateTracker;

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Whether the job snapshot was fetched.
    pub fetched: bool,
    /// Jobs in the snapshot.
    pub jobs: usize,
    /// New builds detected.
    pub events: usize,
    /// Notifications delivered.
    pub dispatched: usize,
    /// Notifications the sink failed to deliver.
    pub failed: usize,
}

/// Run one fetch → classify → notify cycle against an explicit tracker.
///
/// Fetch and dispatch failures are logged and reflected in the report; they
/// never abort the cycle.
pub async fn run_cycle(
    ci: &dyn CiServer,
    sink: &dyn NotificationSink,
    channel: &str,
    tracker: &mut JobStateTracker,
) -> CycleReport {
    let mut report = CycleReport::default();

    let jobs = match ci.list_jobs().await {
        Ok(jobs) => jobs,
        Err(e) => {
            warn!(server = ci.name(), error = %e, "Failed to fetch jobs");
            return report;
        }
    };
    report.fetched = true;
    report.jobs = jobs.len();

    let events = tracker.classify(&jobs);
    report.events = events.len();
    debug!(jobs = report.jobs, events = report.events, "Classified job snapshot");

    for event in &events {
        info!(
            job = %event.job_name,
            build = event.build_number,
            terminal = event.phase.is_terminal(),
            "New build detected"
        );

        let text = format_event(event);
        match sink.post(channel, &text).await {
            Ok(()) => report.dispatched += 1,
            Err(e) => {
                error!(
                    job = %event.job_name,
                    build = event.build_number,
                    error = %e,
                    "Failed to post build notification"
                );
                report.failed += 1;
            }
        }
    }

    report
}

/// Periodically polls the CI server and posts new builds to a channel.
pub struct Poller {
    ci: Arc<dyn CiServer>,
    sink: Arc<dyn NotificationSink>,
    channel: String,
    interval: Duration,
    tracker: JobStateTracker,
}

impl Poller {
    pub fn new(
        ci: Arc<dyn CiServer>,
        sink: Arc<dyn NotificationSink>,
        channel: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            ci,
            sink,
            channel: channel.into(),
            interval,
            tracker: JobStateTracker::new(),
        }
    }

    pub fn tracker(&self) -> &JobStateTracker {
        &self.tracker
    }

    /// Run a single cycle.
    pub async fn poll_once(&mut self) -> CycleReport {
        run_cycle(
            self.ci.as_ref(),
            self.sink.as_ref(),
            &self.channel,
            &mut self.tracker,
        )
        .await
    }

    /// Run the poll loop until a shutdown signal arrives.
    ///
    /// The signal is checked between cycles and while sleeping; a cycle in
    /// progress always completes. Dropping every sender also stops the loop.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            server = self.ci.name(),
            channel = %self.channel,
            interval_secs = self.interval.as_secs(),
            "Starting build monitor"
        );

        loop {
            if !matches!(
                shutdown.try_recv(),
                Err(broadcast::error::TryRecvError::Empty)
            ) {
                break;
            }

            let report = self.poll_once().await;
            debug!(?report, "Poll cycle finished");

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        info!(tracked_jobs = self.tracker.len(), "Build monitor stopped");
    }
}

/// Tell every running poller to stop after its current cycle.
///
/// Returns `false` when no poller is listening any more.
pub fn request_shutdown(shutdown: &broadcast::Sender<()>) -> bool {
    if shutdown.send(()).is_err() {
        debug!("Build monitor already stopped");
        return false;
    }
    true
}
