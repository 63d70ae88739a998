//! HTTP front for a testbed transport.
//!
//! `/health` answers directly; every other request is forwarded verbatim to
//! [`TestbedHttp::request`] and its status and JSON body are sent back.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use drive_testbed_core::{HttpResponse, TestbedHttp};
use tower_http::trace::TraceLayer;

/// Header carrying the testbed's own reason phrase, which HTTP/1.1 servers
/// otherwise replace with the canonical one.
pub const REASON_HEADER: &str = "x-testbed-reason";

#[derive(Clone)]
pub struct AppState {
    pub http: TestbedHttp,
}

pub fn router(http: TestbedHttp) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .fallback(forward)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { http })
}

async fn forward(State(state): State<AppState>, method: Method, uri: Uri, body: Bytes) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let body = (!body.is_empty()).then(|| String::from_utf8_lossy(&body).into_owned());
    let http = state.http.clone();

    // The directory lock is synchronous; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || {
        http.request(&target, method.as_str(), body.as_deref())
    })
    .await;

    match result {
        Ok(response) => into_response(response),
        Err(err) => {
            tracing::error!(error = %err, "testbed request task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn into_response(response: HttpResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut reply = (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response();
    if let Ok(reason) = response.reason.parse::<header::HeaderValue>() {
        reply.headers_mut().insert(REASON_HEADER, reason);
    }
    reply
}
