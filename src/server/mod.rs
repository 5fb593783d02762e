//! The tool server: JSON-RPC over HTTP, backed by the SQLite stores.

pub mod tools;

use crate::curriculum::CurriculumService;
use crate::errors::ToolError;
use crate::mcp::{self, RpcRequest, RpcResponse};
use crate::store::weights::WeightStore;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared state behind every tool handler
#[derive(Clone)]
pub struct AppState {
    pub weights: WeightStore,
    pub curriculum: CurriculumService,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new().route("/rpc", post(rpc_handler)).with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    eprintln!("[tool-server] listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn rpc_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RpcRequest>,
) -> Json<RpcResponse> {
    Json(handle_request(&state, request).await)
}

/// Protocol dispatch, separated from the HTTP layer for testing.
pub async fn handle_request(state: &AppState, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();

    match request.method.as_str() {
        "initialize" => RpcResponse::ok(
            id,
            json!({
                "protocolVersion": mcp::PROTOCOL_VERSION,
                "serverInfo": {
                    "name": "polybot-tools",
                    "version": env!("CARGO_PKG_VERSION"),
                },
                "capabilities": { "tools": {} },
            }),
        ),
        "tools/list" => RpcResponse::ok(id, json!({ "tools": tools::tool_defs() })),
        "tools/call" => {
            let Some(params) = request.params else {
                return RpcResponse::err(id, mcp::INVALID_PARAMS, "missing params");
            };
            let Some(name) = params.get("name").and_then(Value::as_str) else {
                return RpcResponse::err(id, mcp::INVALID_PARAMS, "missing tool name");
            };
            let args = params
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| json!({}));

            match tools::call(state, name, &args).await {
                Ok(result) => RpcResponse::ok(
                    id,
                    json!({
                        "content": [{ "type": "text", "text": result.text }],
                        "isError": result.is_error,
                    }),
                ),
                Err(ToolError::Validation(msg)) => {
                    RpcResponse::err(id, mcp::INVALID_PARAMS, msg)
                }
                Err(e) => {
                    eprintln!("[tool-server] {} failed: {}", name, e);
                    RpcResponse::err(id, mcp::INTERNAL_ERROR, e.to_string())
                }
            }
        }
        other => RpcResponse::err(
            id,
            mcp::METHOD_NOT_FOUND,
            format!("unknown method: {}", other),
        ),
    }
}
