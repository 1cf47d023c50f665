//! Application state.

use std::sync::Arc;

use secrecy::SecretString;

use crate::CommandHandler;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<CommandHandler>,
    /// Slack signing secret. Requests are accepted unverified when unset.
    pub signing_secret: Option<SecretString>,
}

impl AppState {
    pub fn new(handler: CommandHandler, signing_secret: Option<SecretString>) -> Self {
        Self {
            handler: Arc::new(handler),
            signing_secret,
        }
    }
}
