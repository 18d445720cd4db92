//! HTTP routes.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::ApiResult;
use crate::tool_handler::{
    ExecuteFunctionParams, FunctionCallParams, FunctionCallResponse, ListToolsResponse,
    ToolHandler,
};

/// Create the router serving every endpoint.
pub fn create_router(handler: Arc<ToolHandler>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/tools", get(list_tools))
        .route("/execute-function", post(execute_function))
        .route("/openai-function-call", post(function_call))
        .with_state(handler)
}

/// Serve `handler` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, handler: Arc<ToolHandler>) -> std::io::Result<()> {
    info!("toolsmith listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(handler))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn list_tools(State(handler): State<Arc<ToolHandler>>) -> ApiResult<Json<ListToolsResponse>> {
    Ok(Json(handler.list_tools().await?))
}

async fn execute_function(
    State(handler): State<Arc<ToolHandler>>,
    payload: Result<Json<ExecuteFunctionParams>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(params) = payload?;
    Ok(Json(handler.execute_function(params).await?))
}

async fn function_call(
    State(handler): State<Arc<ToolHandler>>,
    payload: Result<Json<FunctionCallParams>, JsonRejection>,
) -> ApiResult<Json<FunctionCallResponse>> {
    let Json(params) = payload?;
    Ok(Json(handler.function_call(params).await?))
}
