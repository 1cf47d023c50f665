//! CI server trait.

use async_trait::async_trait;

use crate::error::{FetchError, TriggerError};
use crate::job::Job;

/// A CI server that can report job state and start builds.
#[async_trait]
pub trait CiServer: Send + Sync {
    /// Name of this backend.
    fn name(&self) -> &'static str;

    /// Fetch a snapshot of every job and its last build.
    async fn list_jobs(&self) -> Result<Vec<Job>, FetchError>;

    /// Ask the server to start a build of the named job.
    async fn trigger_build(&self, job_name: &str) -> Result<(), TriggerError>;
}
