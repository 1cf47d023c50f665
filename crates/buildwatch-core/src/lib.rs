//! Core domain types and traits for BuildWatch.
//!
//! This crate contains:
//! - Job and build snapshot types as reported by the CI server
//! - Build events detected between snapshots
//! - The `CiServer` and `NotificationSink` traits
//! - The error taxonomy shared by every backend

pub mod ci;
pub mod error;
pub mod event;
pub mod job;
pub mod notify;

pub use ci::CiServer;
pub use error::{DispatchError, FetchError, TriggerError};
pub use event::{BuildEvent, BuildPhase};
pub use job::{BuildResult, Job, LastBuild};
pub use notify::NotificationSink;
