//! Tool descriptors: named capabilities a persona's agent may call.
//!
//! A descriptor is the same shape whether the tool runs in-process (the
//! weather tool) or proxies to the tool server over the wire; the agent
//! loop never knows the difference.

pub mod weather;

use crate::errors::ToolError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

/// Normalized result of a tool invocation.
///
/// Every transport-specific wrapper (content arrays, JSON strings) is
/// decoded into one of these shapes at the boundary, before the agent
/// layer sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Plain text payload
    Text(String),
    /// Structured record or list
    Json(Value),
    /// Tool-level error the model should narrate (validation, not-found)
    Error { code: String, message: String },
}

impl ToolOutcome {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ToolOutcome::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Render the outcome as the string fed back to the model.
    pub fn to_llm_text(&self) -> String {
        match self {
            ToolOutcome::Text(s) => s.clone(),
            ToolOutcome::Json(v) => v.to_string(),
            ToolOutcome::Error { code, message } => {
                json!({ "error": { "code": code, "message": message } }).to_string()
            }
        }
    }
}

/// The invokable side of a tool.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(&self, args: Value) -> Result<ToolOutcome, ToolError>;
}

/// A named tool bound to an invoker. Identity is the name; names are
/// unique within a discovered set.
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's arguments
    pub input_schema: Value,
    pub invoker: Arc<dyn ToolInvoker>,
}

impl ToolDescriptor {
    pub fn new(
        name: &str,
        description: &str,
        input_schema: Value,
        invoker: Arc<dyn ToolInvoker>,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
            invoker,
        }
    }

    /// OpenAI function-calling schema for this tool
    pub fn llm_schema(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.input_schema,
            }
        })
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Schema for tools that take no arguments
pub fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}
