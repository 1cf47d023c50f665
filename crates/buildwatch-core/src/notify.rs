//! Notification sink trait.

use async_trait::async_trait;

use crate::error::DispatchError;

/// Destination for human-readable notifications.
///
/// Implementations must tolerate concurrent `post` calls from the poller and
/// from command handlers.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Post a message to a channel.
    async fn post(&self, channel: &str, text: &str) -> Result<(), DispatchError>;
}
