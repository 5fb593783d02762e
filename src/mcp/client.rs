//! Bot-side client for the tool server.

use super::{RpcRequest, RpcResponse, ToolDef};
use crate::errors::ToolError;
use crate::tools::{ToolDescriptor, ToolInvoker, ToolOutcome};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub struct McpClient {
    http: reqwest::Client,
    url: String,
}

impl McpClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    async fn rpc(&self, method: &str, params: Option<Value>) -> Result<Value, ToolError> {
        let request = RpcRequest::new(method, params);

        let resp = self.http.post(&self.url).json(&request).send().await?;
        if !resp.status().is_success() {
            return Err(ToolError::Transport(format!(
                "tool server returned {}",
                resp.status()
            )));
        }

        let body: RpcResponse = resp
            .json()
            .await
            .map_err(|e| ToolError::Transport(format!("invalid RPC response: {}", e)))?;

        if let Some(err) = body.error {
            return Err(ToolError::Transport(format!(
                "RPC error {}: {}",
                err.code, err.message
            )));
        }

        body.result
            .ok_or_else(|| ToolError::Transport("RPC response missing result".into()))
    }

    /// Perform the protocol handshake
    pub async fn initialize(&self) -> Result<(), ToolError> {
        self.rpc(
            "initialize",
            Some(json!({ "protocolVersion": super::PROTOCOL_VERSION })),
        )
        .await?;
        Ok(())
    }

    /// List the tools the server currently advertises
    pub async fn list_tools(&self) -> Result<Vec<ToolDef>, ToolError> {
        let result = self.rpc("tools/list", None).await?;
        let tools = result
            .get("tools")
            .cloned()
            .ok_or_else(|| ToolError::Transport("tools/list result missing 'tools'".into()))?;
        serde_json::from_value(tools)
            .map_err(|e| ToolError::Transport(format!("invalid tool list: {}", e)))
    }

    /// Invoke a remote tool and normalize its result
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<ToolOutcome, ToolError> {
        let result = self
            .rpc("tools/call", Some(json!({ "name": name, "arguments": args })))
            .await?;
        Ok(decode_result(&result))
    }
}

/// Normalize a `tools/call` result into a [`ToolOutcome`].
///
/// The wire shape is `{content: [{type: "text", text}], isError}`. Text
/// parts are joined; payloads that parse as JSON objects or arrays become
/// structured outcomes, everything else stays text. This is the single
/// decode step between the wire and the agent layer.
pub fn decode_result(result: &Value) -> ToolOutcome {
    let is_error = result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let text = match result.get("content").and_then(Value::as_array) {
        Some(parts) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        // No content wrapper: treat the raw result as the payload
        None => result.to_string(),
    };

    if is_error {
        return ToolOutcome::error("tool_error", text);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(v @ Value::Object(_)) | Ok(v @ Value::Array(_)) => ToolOutcome::Json(v),
        _ => ToolOutcome::Text(text),
    }
}

/// A discovered tool that proxies invocations to the server
struct RemoteTool {
    client: Arc<McpClient>,
    name: String,
}

#[async_trait]
impl ToolInvoker for RemoteTool {
    async fn invoke(&self, args: Value) -> Result<ToolOutcome, ToolError> {
        self.client.call_tool(&self.name, args).await
    }
}

/// Wrap advertised tool definitions into invokable descriptors
pub fn into_descriptors(client: Arc<McpClient>, defs: Vec<ToolDef>) -> Vec<ToolDescriptor> {
    defs.into_iter()
        .map(|def| {
            let invoker = Arc::new(RemoteTool {
                client: client.clone(),
                name: def.name.clone(),
            });
            ToolDescriptor::new(&def.name, &def.description, def.input_schema, invoker)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plain_text() {
        let result = json!({
            "content": [{ "type": "text", "text": "✅ Recorded: 75 kg" }],
            "isError": false
        });
        assert_eq!(
            decode_result(&result),
            ToolOutcome::Text("✅ Recorded: 75 kg".into())
        );
    }

    #[test]
    fn decode_structured_record() {
        let payload = json!({ "weight": 75.0, "unit": "kg" });
        let result = json!({
            "content": [{ "type": "text", "text": payload.to_string() }],
            "isError": false
        });
        assert_eq!(decode_result(&result), ToolOutcome::Json(payload));
    }

    #[test]
    fn decode_structured_list() {
        let payload = json!([{ "weight": 75.0 }, { "weight": 74.5 }]);
        let result = json!({
            "content": [{ "type": "text", "text": payload.to_string() }],
            "isError": false
        });
        assert_eq!(decode_result(&result), ToolOutcome::Json(payload));
    }

    #[test]
    fn decode_error_flag() {
        let result = json!({
            "content": [{ "type": "text", "text": "unit must be kg or lbs" }],
            "isError": true
        });
        match decode_result(&result) {
            ToolOutcome::Error { code, message } => {
                assert_eq!(code, "tool_error");
                assert_eq!(message, "unit must be kg or lbs");
            }
            other => panic!("expected error outcome, got {:?}", other),
        }
    }

    #[test]
    fn decode_without_content_wrapper() {
        let result = json!({ "weight": 75.0 });
        // Raw results are stringified then re-parsed, ending up structured
        assert_eq!(decode_result(&result), ToolOutcome::Json(result.clone()));
    }

    #[test]
    fn decode_numeric_text_stays_text() {
        let result = json!({
            "content": [{ "type": "text", "text": "42" }],
            "isError": false
        });
        assert_eq!(decode_result(&result), ToolOutcome::Text("42".into()));
    }
}
