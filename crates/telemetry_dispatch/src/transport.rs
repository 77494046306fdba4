//! HTTP transport adapter built on axum.
//!
//! This is the only module that knows about a concrete HTTP server. It turns
//! an axum request into a [`Transaction`], asks the [`Dispatcher`] to
//! authorize it from headers alone, reads the body only for admitted callers,
//! and writes exactly one response back:
//!
//! - rejections and unrouted requests: their status with a plain-text body
//! - handled requests: the handler's `code` with the JSON-serialized response
//! - fatal dispatch errors: `500` with an empty body

use crate::dispatcher::UNROUTED_MESSAGE;
use crate::{DispatchError, Dispatcher, Outcome, Transaction};
use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Largest request body accepted by default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Route that accepts telemetry posts
    pub path: String,
    /// Requests with larger bodies are answered with 413
    pub max_body_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            path: "/telemetry".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

struct TransportState<C>
where
    C: Send + Sync + 'static,
{
    dispatcher: Arc<Dispatcher<C>>,
    max_body_bytes: usize,
}

impl<C> Clone for TransportState<C>
where
    C: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Builds the router: `POST {path}` for telemetry and `GET /health`.
pub fn router<C>(dispatcher: Arc<Dispatcher<C>>, config: &TransportConfig) -> Router
where
    C: Send + Sync + 'static,
{
    let state = TransportState {
        dispatcher,
        max_body_bytes: config.max_body_bytes,
    };

    Router::new()
        .route(&config.path, post(receive::<C>))
        .route("/health", get(health))
        .with_state(state)
}

/// Serves `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!("🌐 Telemetry endpoint listening on {}", local_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

async fn receive<C>(State(state): State<TransportState<C>>, request: Request) -> Response
where
    C: Send + Sync + 'static,
{
    let (parts, body) = request.into_parts();

    let mut transaction = Transaction::default();
    for (name, value) in parts.headers.iter() {
        if let Ok(value) = value.to_str() {
            transaction.insert_header(name.as_str(), value);
        }
    }
    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        transaction = transaction.with_remote_addr(*addr);
    }

    if let Some(refused) = state.dispatcher.authorize(&transaction) {
        return into_http_response(Ok(refused));
    }

    match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => transaction.set_body(bytes.to_vec()),
        Err(_) => return (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large").into_response(),
    }

    into_http_response(state.dispatcher.dispatch(&transaction).await)
}

/// Maps a dispatch result onto the single HTTP response sent for it.
pub fn into_http_response(result: Result<Outcome, DispatchError>) -> Response {
    match result {
        Ok(Outcome::Rejected(rejection)) => {
            (status_code(rejection.status()), rejection.to_string()).into_response()
        }
        Ok(Outcome::Unrouted { status, .. }) => {
            (status_code(status), UNROUTED_MESSAGE).into_response()
        }
        Ok(Outcome::Responded(response)) => match StatusCode::from_u16(response.code) {
            Ok(status) => (status, Json(response)).into_response(),
            Err(_) => {
                error!("❌ Handler returned unusable status code {}", response.code);
                empty(StatusCode::INTERNAL_SERVER_ERROR)
            }
        },
        Err(dispatch_error) => {
            error!("❌ Dispatch failed: {}", dispatch_error);
            empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn empty(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rejection;
    use telemetry_types::ContentType;

    #[tokio::test]
    async fn test_rejection_maps_to_plain_text() {
        let response = into_http_response(Ok(Outcome::Rejected(Rejection::MissingContent)));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Missing content");
    }

    #[tokio::test]
    async fn test_unrouted_maps_to_configured_status() {
        let response = into_http_response(Ok(Outcome::Unrouted {
            content_type: ContentType::Log,
            status: 501,
        }));
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], UNROUTED_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_fatal_error_sends_empty_500() {
        let response = into_http_response(Err(DispatchError::MissingResponse {
            content_type: ContentType::Chat,
            handler: "chat".to_string(),
        }));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
