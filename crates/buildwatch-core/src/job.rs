//! Jobs and builds as reported by the CI server.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A named, independently buildable unit on the CI server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Job name, unique within a snapshot.
    pub name: String,
    /// Base URL of the job page, used to build links to individual builds.
    pub url: String,
    /// Most recent build, absent if the job has never run.
    #[serde(default)]
    pub last_build: Option<LastBuild>,
}

impl Job {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            last_build: None,
        }
    }

    /// Attach a last build to this job.
    pub fn with_last_build(mut self, last_build: LastBuild) -> Self {
        self.last_build = Some(last_build);
        self
    }

    /// Link to a specific build of this job.
    pub fn build_url(&self, number: u64) -> String {
        format!("{}{}/", self.url, number)
    }
}

/// Metadata about the most recent build of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastBuild {
    /// Build number. Increases per job but is not contiguous.
    pub number: u64,
    /// Whether the build is still in progress.
    #[serde(default)]
    pub building: bool,
    /// Terminal outcome, absent while building.
    #[serde(default)]
    pub result: Option<BuildResult>,
}

impl LastBuild {
    pub fn building(number: u64) -> Self {
        Self {
            number,
            building: true,
            result: None,
        }
    }

    pub fn finished(number: u64, result: BuildResult) -> Self {
        Self {
            number,
            building: false,
            result: Some(result),
        }
    }
}

/// Terminal outcome of a build.
///
/// Unknown outcomes (`UNSTABLE`, `NOT_BUILT`, ...) keep their literal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildResult {
    #[display("SUCCESS")]
    Success,
    #[display("FAILURE")]
    Failure,
    #[display("ABORTED")]
    Aborted,
    #[display("{_0}")]
    Other(String),
}

impl From<&str> for BuildResult {
    fn from(s: &str) -> Self {
        match s {
            "SUCCESS" => BuildResult::Success,
            "FAILURE" => BuildResult::Failure,
            "ABORTED" => BuildResult::Aborted,
            other => BuildResult::Other(other.to_string()),
        }
    }
}

impl From<String> for BuildResult {
    fn from(s: String) -> Self {
        match s.as_str() {
            "SUCCESS" | "FAILURE" | "ABORTED" => BuildResult::from(s.as_str()),
            _ => BuildResult::Other(s),
        }
    }
}

impl From<BuildResult> for String {
    fn from(result: BuildResult) -> Self {
        result.to_string()
    }
}
