// Status HTTP routes
//
// Design Decision: One route, `GET /status`, answering `{"result": "<status>"}`.
// Design Decision: The source is shared through axum state, never a global.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use jobpoll::{StatusResponse, STATUS_PATH};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::source::StatusSource;

/// Create status routes
pub fn routes(source: Arc<StatusSource>) -> Router {
    Router::new()
        .route(STATUS_PATH, get(get_status))
        .with_state(source)
        .layer(TraceLayer::new_for_http())
}

/// GET /status - Current status of the simulated job
pub async fn get_status(State(source): State<Arc<StatusSource>>) -> Json<StatusResponse> {
    Json(StatusResponse::new(&source.query()))
}

/// Serve status routes on `listener` until the server fails
pub async fn serve(listener: TcpListener, source: Arc<StatusSource>) -> std::io::Result<()> {
    axum::serve(listener, routes(source)).await
}

/// Bind `addr`, serve status routes in the background, and return the bound address
pub async fn spawn(
    addr: impl ToSocketAddrs,
    source: Arc<StatusSource>,
) -> std::io::Result<(SocketAddr, JoinHandle<std::io::Result<()>>)> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("Status source listening on {}", local_addr);

    let handle = tokio::spawn(serve(listener, source));
    Ok((local_addr, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use jobpoll::JobStatus;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_status_route_reports_pending() {
        let source = Arc::new(StatusSource::with_delay(Duration::from_secs(60)));

        let (status, body) = get_json(routes(source), "/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "result": "pending" }));
    }

    #[tokio::test]
    async fn test_status_route_reports_resolution() {
        let source = Arc::new(
            StatusSource::with_delay(Duration::ZERO)
                .with_resolution(crate::source::Resolution::Error),
        );

        let (status, body) = get_json(routes(source.clone()), "/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "result": "error" }));
        assert_eq!(source.query(), JobStatus::Error);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let source = Arc::new(StatusSource::with_delay(Duration::ZERO));

        let (status, _) = get_json(routes(source), "/jobs").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
