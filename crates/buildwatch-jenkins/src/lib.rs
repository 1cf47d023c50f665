//! Jenkins backend for BuildWatch.
//!
//! Talks to the Jenkins JSON API with basic authentication (user + API token).

pub mod client;

pub use buildwatch_core::ci::CiServer;
pub use client::JenkinsClient;
