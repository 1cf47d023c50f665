//! Build state tracking for BuildWatch.
//!
//! Polls the CI server, detects builds that have not been announced yet and
//! posts one message per new build to the notification sink.

pub mod message;
pub mod poller;
pub mod tracker;

pub use message::format_event;
pub use poller::{CycleReport, Poller, request_shutdown};
pub use tracker::JobStateTracker;
