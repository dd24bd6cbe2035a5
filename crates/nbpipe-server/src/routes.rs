//! HTTP routes for the nbpipe server.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    response::Json,
    routing::{get, post},
};
use nbpipe_core::compile::CompileOrchestrator;
use nbpipe_core::{EnvConfig, MarshalStore};
use tower_http::cors::CorsLayer;

use crate::error::RpcError;
use crate::handlers;
use crate::protocol::{RpcRequest, RpcResponse, new_trans_id};

/// Application state shared across handlers.
pub struct AppState {
    /// Environment captured at startup.
    pub env: EnvConfig,
    /// Marshal directory access.
    pub store: MarshalStore,
    /// Compile pipeline; `None` when no converter was configured.
    pub compiler: Option<CompileOrchestrator>,
}

/// Create the router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/rpc", post(rpc_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Decode the envelope, run the method off the async runtime and wrap the outcome.
async fn rpc_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Json<RpcResponse> {
    let request: RpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let err = RpcError::InvalidArguments(format!("malformed request: {e}"));
            tracing::warn!("{}", err);
            return Json(RpcResponse::failure(&err, new_trans_id()));
        }
    };
    let trans_id = request.trans_id.clone().unwrap_or_else(new_trans_id);

    let span = tracing::info_span!("rpc", method = %request.method, trans_id = %trans_id);
    let outcome = tokio::task::spawn_blocking(move || {
        let _enter = span.enter();
        tracing::debug!("Handling request");
        handlers::dispatch(&state, &request)
    })
    .await
    .unwrap_or_else(|e| Err(RpcError::TaskFailed(e.to_string())));

    Json(match outcome {
        Ok(result) => RpcResponse::success(result, trans_id),
        Err(err) => {
            tracing::debug!(trans_id = %trans_id, code = err.code().as_i32(), "RPC failed: {}", err);
            RpcResponse::failure(&err, trans_id)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RpcCode;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use nbpipe_core::Notebook;
    use nbpipe_core::notebook::Cell;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn router() -> Router {
        create_router(Arc::new(AppState {
            env: EnvConfig::default(),
            store: MarshalStore::new(),
            compiler: None,
        }))
    }

    async fn rpc(body: impl Into<Body>) -> RpcResponse {
        let response = router()
            .oneshot(
                Request::post("/rpc")
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rpc_success_echoes_trans_id() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nb.ipynb");
        let mut nb = Notebook::new();
        nb.cells = vec![Cell::code("epochs = 5", &["pipeline-parameters"])];
        nb.write_to_file(&path).unwrap();

        let body = serde_json::json!({
            "method": "nb.get_pipeline_parameters",
            "trans_id": "abc-123",
            "kwargs": { "source_notebook_path": path },
        });
        let response = rpc(body.to_string()).await;

        assert_eq!(
            response,
            RpcResponse::success(serde_json::json!([["epochs", "int", "5"]]), "abc-123")
        );
    }

    #[tokio::test]
    async fn test_rpc_failure_generates_trans_id() {
        let response = rpc(r#"{"method": "nb.nope"}"#).await;
        assert_eq!(response.code(), RpcCode::NotFound);
        assert_eq!(response.trans_id().len(), 36);

        let RpcResponse::Failure { err_details, err_cls, .. } = response else {
            panic!("expected a failure");
        };
        assert_eq!(err_details, "Method not found: nb.nope");
        assert_eq!(err_cls, "MethodNotFound");
    }

    #[tokio::test]
    async fn test_rpc_malformed_body() {
        let response = rpc("not json").await;
        assert_eq!(response.code(), RpcCode::EncodingError);
    }
}
