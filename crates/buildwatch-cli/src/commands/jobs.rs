//! Job commands.

use std::path::Path;

use anyhow::{Context, Result};
use buildwatch_core::{CiServer, Job};

pub async fn list(config: Option<&Path>) -> Result<()> {
    let config = super::load(config)?;
    let jenkins = super::jenkins(&config)?;

    let jobs = jenkins.list_jobs().await.context("failed to list jobs")?;
    if jobs.is_empty() {
        println!("No jobs found");
        return Ok(());
    }

    for job in &jobs {
        println!("{}", describe(job));
    }
    Ok(())
}

pub async fn trigger(config: Option<&Path>, job: &str) -> Result<()> {
    let config = super::load(config)?;
    let jenkins = super::jenkins(&config)?;

    jenkins
        .trigger_build(job)
        .await
        .with_context(|| format!("failed to trigger {}", job))?;
    println!("Triggered {}", job);
    Ok(())
}

/// One line per job: name, last build number and its state.
fn describe(job: &Job) -> String {
    match &job.last_build {
        None => format!("{:<30} never built", job.name),
        Some(build) if build.building => format!("{:<30} #{:<6} building", job.name, build.number),
        Some(build) => {
            let result = build
                .result
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown".to_string());
            format!("{:<30} #{:<6} {}", job.name, build.number, result)
        }
    }
}
