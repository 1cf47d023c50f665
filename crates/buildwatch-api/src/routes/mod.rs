//! HTTP routes.

pub mod health;
pub mod slack;

use crate::AppState;
use axum::Router;

/// Build the main router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/slack", slack::router())
        .merge(health::router())
        .with_state(state)
}
