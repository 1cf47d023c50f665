//! Build events detected between job snapshots.

use serde::{Deserialize, Serialize};

use crate::job::BuildResult;

/// A newly observed build, eligible for notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEvent {
    pub job_name: String,
    pub build_number: u64,
    pub build_url: String,
    pub phase: BuildPhase,
}

/// What was observed about the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildPhase {
    /// The build is in progress.
    Started,
    /// The build reached a terminal outcome.
    Finished(BuildResult),
}

impl BuildPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildPhase::Finished(_))
    }
}
