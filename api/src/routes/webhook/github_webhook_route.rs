use axum::{
    extract::{Json, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    core::{
        app_state::AppState,
        http::response_envelope::{ApiErrorDetail, ApiResponse, MessageData},
    },
    routes::webhook::webhook_payload::{SecretQuery, WebhookPayload, to_bot_event},
};

const EVENT_HEADER: &str = "X-GitHub-Event";

/// Compares the configured secret with the provided one.
fn check_secret(expected: &str, provided: Option<&str>) -> Result<(), Response> {
    let expected = expected.trim();
    if expected.is_empty() {
        return Err(ApiResponse::<()>::error(
            "SERVER_CONFIG_ERROR",
            "Trigger secret is not configured.",
            vec![ApiErrorDetail {
                path: Some("secret".into()),
                hint: Some("Set TRIGGER_SECRET on the server.".into()),
            }],
        )
        .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR));
    }

    let provided = provided.map(str::trim).unwrap_or_default();
    if provided != expected {
        return Err(ApiResponse::<()>::error(
            "UNAUTHORIZED",
            "Invalid trigger secret.",
            vec![ApiErrorDetail {
                path: Some("secret".into()),
                hint: Some("Secret does not match the configured trigger secret.".into()),
            }],
        )
        .into_response_with_status(StatusCode::UNAUTHORIZED));
    }
    Ok(())
}

fn accepted(message: &str) -> Response {
    ApiResponse::success(MessageData {
        message: message.to_string(),
    })
    .into_response_with_status(StatusCode::ACCEPTED)
}

/// GitHub webhook intake.
///
/// Answers right away; the bot works on a spawned task and reports back
/// through GitHub comments.
#[instrument(name = "github_webhook_route", skip_all)]
pub async fn github_webhook_route(
    State(state): State<AppState>,
    Query(query): Query<SecretQuery>,
    headers: HeaderMap,
    Json(payload): Json<WebhookPayload>,
) -> Response {
    if let Err(resp) = check_secret(&state.trigger_secret, query.secret.as_deref()) {
        warn!("webhook refused");
        return resp;
    }

    let event_name = headers
        .get(EVENT_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    let Some(event) = to_bot_event(event_name, &payload) else {
        debug!(event = event_name, action = ?payload.action, "webhook ignored");
        return accepted("ignored");
    };

    info!(event = event_name, ?event, "webhook accepted");
    let bot = state.bot.clone();
    tokio::spawn(async move {
        bot.handle(event).await;
    });

    accepted("accepted")
}
