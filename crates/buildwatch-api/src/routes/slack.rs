//! Slack endpoints: slash commands and Events API callbacks.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use buildwatch_slack::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use buildwatch_slack::{
    CallbackEvent, EventEnvelope, SignatureError, SlashCommand, verify_signature,
};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::json;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::AppState;
use crate::commands::BuildRequest;
use crate::error::ApiError;

/// Set by Slack when it redelivers an event it considers unacknowledged.
const RETRY_HEADER: &str = "X-Slack-Retry-Num";

const BUILD_COMMAND: &str = "/build";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/commands", post(slash_command))
        .route("/events", post(event_callback))
}

/// Handle a slash command.
///
/// `/build` is acknowledged as soon as the handler signals, and the builds
/// are triggered in the background.
async fn slash_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    verify(&state, &headers, &body)?;
    let command = SlashCommand::from_form(&body)?;

    info!(
        command = %command.command,
        user = %command.display_name(),
        channel = %command.channel_id,
        "Received slash command"
    );

    if command.command != BUILD_COMMAND {
        return Ok(Json(json!({
            "text": format!("Unknown command: {}", command.command)
        })));
    }

    let request = BuildRequest::from(&command);
    let (ack_tx, ack_rx) = oneshot::channel();
    let handler = state.handler.clone();
    tokio::spawn(async move {
        handler.handle_build(request, ack_tx).await;
    });

    let ack = ack_rx.await.map_err(|_| {
        error!("Build handler stopped before acknowledging");
        ApiError::Internal("build handler failed".to_string())
    })?;

    Ok(Json(json!({ "text": ack })))
}

/// Handle an Events API request.
async fn event_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    verify(&state, &headers, &body)?;

    if let Some(retry) = headers.get(RETRY_HEADER).and_then(|v| v.to_str().ok()) {
        debug!(retry = %retry, "Ignoring redelivered Slack event");
        return Ok(StatusCode::OK.into_response());
    }

    match EventEnvelope::from_json(&body)? {
        EventEnvelope::UrlVerification { challenge } => {
            info!("Answering Slack URL verification");
            Ok(Json(json!({ "challenge": challenge })).into_response())
        }
        EventEnvelope::EventCallback {
            event: CallbackEvent::AppMention(mention),
            event_id,
        } => {
            info!(
                event_id = ?event_id,
                user = %mention.user,
                channel = %mention.channel,
                "Bot mentioned"
            );
            let handler = state.handler.clone();
            tokio::spawn(async move {
                handler.handle_mention(&mention.channel, &mention.user).await;
            });
            Ok(StatusCode::OK.into_response())
        }
        EventEnvelope::EventCallback { .. } | EventEnvelope::Unknown => {
            debug!("Ignoring unsubscribed Slack event");
            Ok(StatusCode::OK.into_response())
        }
    }
}

fn verify(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), ApiError> {
    let Some(secret) = &state.signing_secret else {
        return Ok(());
    };

    let timestamp = header_str(headers, TIMESTAMP_HEADER)?;
    let signature = header_str(headers, SIGNATURE_HEADER)?;

    verify_signature(
        secret.expose_secret(),
        timestamp,
        body,
        signature,
        Utc::now().timestamp(),
    )?;
    Ok(())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(SignatureError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::CommandHandler;
    use crate::commands::ACK_TEXT;
    use crate::routes;
    use crate::testing::{FakeCi, RecordingSink};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use buildwatch_slack::signature::sign;
    use secrecy::SecretString;
    use serde_json::Value;
    use tower::ServiceExt;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

    fn app(ci: Arc<FakeCi>, sink: Arc<RecordingSink>, secret: Option<&str>) -> Router {
        let handler = CommandHandler::new(ci, sink, None);
        let state = AppState::new(handler, secret.map(|s| SecretString::from(s.to_string())));
        routes::router(state)
    }

    fn signed(uri: &str, body: &'static str) -> Request<Body> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(SECRET, &timestamp, body.as_bytes()).unwrap();
        Request::post(uri)
            .header(TIMESTAMP_HEADER, timestamp)
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn wait_for_posts(sink: &RecordingSink, count: usize) {
        for _ in 0..100 {
            if sink.posts().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} posts, got {:?}", count, sink.posts());
    }

    #[tokio::test]
    async fn test_build_command_acknowledged() {
        let ci = Arc::new(FakeCi::with_jobs(&["api", "web"]));
        let sink = Arc::new(RecordingSink::default());
        let app = app(ci.clone(), sink.clone(), Some(SECRET));

        let response = app
            .oneshot(signed(
                "/slack/commands",
                "command=%2Fbuild&user_id=U7&user_name=ada&channel_id=C42&text=",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["text"], ACK_TEXT);

        wait_for_posts(&sink, 3).await;
        assert_eq!(ci.triggered(), vec!["api", "web"]);
        assert!(sink.posts().iter().all(|(channel, _)| channel == "C42"));
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let ci = Arc::new(FakeCi::with_jobs(&["api"]));
        let sink = Arc::new(RecordingSink::default());
        let app = app(ci.clone(), sink, Some(SECRET));

        let response = app
            .oneshot(signed(
                "/slack/commands",
                "command=%2Fdeploy&user_id=U7&channel_id=C42",
            ))
            .await
            .unwrap();

        assert_eq!(json_body(response).await["text"], "Unknown command: /deploy");
        assert_eq!(ci.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_unsigned_request_rejected() {
        let ci = Arc::new(FakeCi::with_jobs(&["api"]));
        let app = app(ci.clone(), Arc::new(RecordingSink::default()), Some(SECRET));

        let request = Request::post("/slack/commands")
            .body(Body::from("command=%2Fbuild&user_id=U7&channel_id=C42"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(ci.triggered().is_empty());
    }

    #[tokio::test]
    async fn test_bad_signature_rejected() {
        let app = app(
            Arc::new(FakeCi::default()),
            Arc::new(RecordingSink::default()),
            Some(SECRET),
        );

        let request = Request::post("/slack/events")
            .header(TIMESTAMP_HEADER, Utc::now().timestamp().to_string())
            .header(SIGNATURE_HEADER, "v0=00ff")
            .body(Body::from(r#"{"type":"url_verification","challenge":"abc"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_fields_bad_request() {
        let app = app(
            Arc::new(FakeCi::default()),
            Arc::new(RecordingSink::default()),
            None,
        );

        let request = Request::post("/slack/commands")
            .body(Body::from("command=%2Fbuild"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_url_verification() {
        let app = app(
            Arc::new(FakeCi::default()),
            Arc::new(RecordingSink::default()),
            Some(SECRET),
        );

        let response = app
            .oneshot(signed(
                "/slack/events",
                r#"{"token":"x","challenge":"3eZbrw1aBm2r","type":"url_verification"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["challenge"], "3eZbrw1aBm2r");
    }

    #[tokio::test]
    async fn test_app_mention_greets() {
        let sink = Arc::new(RecordingSink::default());
        let app = app(Arc::new(FakeCi::default()), sink.clone(), Some(SECRET));

        let response = app
            .oneshot(signed(
                "/slack/events",
                r#"{"type":"event_callback","event_id":"Ev1","event":{"type":"app_mention","user":"U7","text":"<@UBOT> hi","channel":"C42","ts":"1.1"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        wait_for_posts(&sink, 1).await;
        assert_eq!(
            sink.posts(),
            vec![(
                "C42".to_string(),
                "Hi <@U7>! I automatically post Jenkins job statuses here.".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_redelivered_event_ignored() {
        let sink = Arc::new(RecordingSink::default());
        let app = app(Arc::new(FakeCi::default()), sink.clone(), None);

        let request = Request::post("/slack/events")
            .header(RETRY_HEADER, "1")
            .body(Body::from(
                r#"{"type":"event_callback","event":{"type":"app_mention","user":"U7","channel":"C42"}}"#,
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sink.posts().is_empty());
    }
}
