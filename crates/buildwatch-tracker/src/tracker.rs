//! Per-job build number watermarks.

use std::collections::HashMap;

use buildwatch_core::{BuildEvent, BuildPhase, Job};
use tracing::debug;

/// Remembers, per job, the highest build number already announced.
///
/// Starts empty, so the first snapshot reports the current build of every job.
#[derive(Debug, Default)]
pub struct JobStateTracker {
    watermarks: HashMap<String, u64>,
}

impl JobStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a snapshot, returning one event per newly observed build.
    ///
    /// The watermark advances before the event is returned, so a build is
    /// never reported twice even if delivering its notification fails.
    pub fn classify(&mut self, snapshot: &[Job]) -> Vec<BuildEvent> {
        let mut events = Vec::new();

        for job in snapshot {
            let Some(last) = &job.last_build else {
                continue;
            };

            let is_new = self
                .watermarks
                .get(&job.name)
                .is_none_or(|&seen| last.number > seen);
            if !is_new {
                continue;
            }

            self.watermarks.insert(job.name.clone(), last.number);

            let phase = if last.building {
                BuildPhase::Started
            } else if let Some(result) = &last.result {
                BuildPhase::Finished(result.clone())
            } else {
                debug!(job = %job.name, build = last.number, "New build has no state yet");
                continue;
            };

            events.push(BuildEvent {
                job_name: job.name.clone(),
                build_number: last.number,
                build_url: job.build_url(last.number),
                phase,
            });
        }

        events
    }

    /// Highest build number recorded for a job.
    pub fn watermark(&self, job_name: &str) -> Option<u64> {
        self.watermarks.get(job_name).copied()
    }

    /// Number of jobs with a recorded watermark.
    pub fn len(&self) -> usize {
        self.watermarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watermarks.is_empty()
    }
}
