//! HTTP server for BuildWatch.
//!
//! Receives Slack slash commands and Events API callbacks, and hosts the
//! handler that triggers Jenkins builds on request.

pub mod commands;
pub mod error;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::{BuildRequest, CommandHandler, TriggerSummary};
pub use state::AppState;
