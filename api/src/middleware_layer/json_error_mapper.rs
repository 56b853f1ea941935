use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

/// Best guess of the webhook field a serde message complains about.
fn guess_path_from_serde_msg(msg: &str) -> Option<String> {
    for key in ["action", "repository", "issue", "pull_request", "comment", "number", "id"] {
        if msg.contains(&format!("`{key}`")) {
            return Some(key.to_string());
        }
    }
    None
}

fn hint_for(msg: &str) -> Option<String> {
    if msg.contains("Content-Type") {
        Some("Configure the webhook with content type application/json.".into())
    } else if msg.contains("missing field") {
        Some("The payload does not look like a GitHub webhook delivery.".into())
    } else if msg.contains("expected") {
        Some("A field has an unexpected JSON type.".into())
    } else {
        None
    }
}

/// Request id for logs: GitHub's delivery id when present.
fn request_id(req: &Request<Body>) -> String {
    req.headers()
        .get("X-GitHub-Delivery")
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("req-{}", Utc::now().timestamp_micros()))
}

/// Rewrites plain-text 400/415/422 rejections (bad JSON bodies) into the
/// `ApiResponse` error envelope.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let req_id = request_id(&req);
    let res = next.run(req).await;
    let status = res.status();

    let code = match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        _ => return res,
    };
    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if is_json {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    let original = String::from_utf8_lossy(&bytes);
    debug!(request_id = %req_id, status = %status, body = %original.trim(), "rejection mapped");

    let envelope = ApiResponse::<()>::error(
        code,
        original.trim(),
        vec![ApiErrorDetail {
            path: guess_path_from_serde_msg(&original),
            hint: hint_for(&original),
        }],
    );
    let body = serde_json::to_vec(&envelope).unwrap_or_else(|_| bytes.to_vec());

    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, body.into())
}
