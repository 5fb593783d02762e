//! Shared test doubles: a scripted LLM client and a recording tool.

use crate::errors::ToolError;
use crate::llm::{
    ChatRequest, ChatResponse, Choice, FunctionCall, LlmClient, Message, ToolCall,
};
use crate::tools::{empty_schema, ToolDescriptor, ToolInvoker, ToolOutcome};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// LLM client that replays a scripted list of responses and records every
/// request it receives.
#[derive(Clone)]
pub struct MockLlmClient {
    responses: Arc<Mutex<Vec<ChatResponse>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockLlmClient {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn response_with_content(content: &str) -> ChatResponse {
        ChatResponse {
            choices: vec![Choice {
                message: Message {
                    role: "assistant".to_string(),
                    content: Some(content.to_string()),
                    tool_calls: None,
                },
                finish_reason: Some("stop".to_string()),
            }],
        }
    }

    pub fn response_with_tool_call(id: &str, name: &str, arguments: &str) -> ChatResponse {
        Self::response_with_tool_calls(vec![(id, name, arguments)])
    }

    pub fn response_with_tool_calls(calls: Vec<(&str, &str, &str)>) -> ChatResponse {
        let tool_calls = calls
            .into_iter()
            .map(|(id, name, arguments)| ToolCall {
                id: id.to_string(),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                },
            })
            .collect();

        ChatResponse {
            choices: vec![Choice {
                message: Message {
                    role: "assistant".to_string(),
                    content: None,
                    tool_calls: Some(tool_calls),
                },
                finish_reason: Some("tool_calls".to_string()),
            }],
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        let mut responses = self.responses.lock().expect("responses lock");
        if responses.is_empty() {
            return Ok(MockLlmClient::response_with_content(""));
        }
        Ok(responses.remove(0))
    }
}

/// Tool invoker that records the arguments of every call and returns a
/// fixed text outcome.
pub struct RecordingTool {
    reply: String,
    calls: Arc<Mutex<Vec<Value>>>,
}

impl RecordingTool {
    /// Build a descriptor plus a handle to its recorded calls
    pub fn descriptor(name: &str, reply: &str) -> (ToolDescriptor, Arc<Mutex<Vec<Value>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let invoker = Arc::new(RecordingTool {
            reply: reply.to_string(),
            calls: calls.clone(),
        });
        (
            ToolDescriptor::new(name, "recording test tool", empty_schema(), invoker),
            calls,
        )
    }
}

#[async_trait]
impl ToolInvoker for RecordingTool {
    async fn invoke(&self, args: Value) -> Result<ToolOutcome, ToolError> {
        self.calls.lock().expect("calls lock").push(args);
        Ok(ToolOutcome::Text(self.reply.clone()))
    }
}
