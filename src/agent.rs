//! Agent runtime: the tool-calling loop behind every persona.
//!
//! One invocation takes a persona's instructions and toolset plus the
//! user's message, and lets the model call tools (serially, in the order
//! it issues them) until it produces a final text answer.

use crate::errors::{AgentFailure, ToolError};
use crate::llm::{ChatRequest, LlmClient, ToolCall};
use crate::tools::{ToolDescriptor, ToolOutcome};
use anyhow::anyhow;
use serde_json::{json, Value};
use std::sync::Arc;

/// Default maximum model round trips per invocation
pub const DEFAULT_MAX_ITERATIONS: usize = 12;

pub struct AgentRunner {
    llm: Arc<dyn LlmClient>,
    model: String,
    max_iterations: usize,
}

impl AgentRunner {
    pub fn new(llm: Arc<dyn LlmClient>, model: &str) -> Self {
        Self {
            llm,
            model: model.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Run one agent invocation to completion.
    ///
    /// Tool calls are executed one at a time in the order the model issued
    /// them, each result fed back before the next model round trip. Fails
    /// rather than returning a partial answer.
    pub async fn invoke(
        &self,
        instructions: &str,
        tools: &[ToolDescriptor],
        input: &str,
    ) -> Result<String, AgentFailure> {
        let schemas: Vec<Value> = tools.iter().map(ToolDescriptor::llm_schema).collect();

        let mut messages = vec![
            json!({ "role": "system", "content": instructions }),
            json!({ "role": "user", "content": input }),
        ];

        for _ in 0..self.max_iterations {
            let request = ChatRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                tools: if schemas.is_empty() {
                    None
                } else {
                    Some(schemas.clone())
                },
                temperature: 0.0,
            };

            let response = self.llm.chat(&request).await.map_err(AgentFailure)?;
            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| AgentFailure(anyhow!("model returned no choices")))?;

            let message = choice.message;
            messages.push(serde_json::to_value(&message).map_err(|e| AgentFailure(e.into()))?);

            match message.tool_calls {
                Some(calls) if !calls.is_empty() => {
                    for call in calls {
                        let content = self.execute_call(tools, &call).await?;
                        messages.push(json!({
                            "role": "tool",
                            "tool_call_id": call.id,
                            "content": content,
                        }));
                    }
                }
                _ => {
                    return Ok(message.content.unwrap_or_default());
                }
            }
        }

        Err(AgentFailure(anyhow!(
            "agent exceeded {} iterations without a final answer",
            self.max_iterations
        )))
    }

    /// Execute one tool call, returning the string fed back to the model.
    ///
    /// Calls naming a tool outside the bound set, and malformed argument
    /// payloads, become structured error results the model can recover
    /// from. Infrastructure failures (storage, transport) abort the
    /// invocation instead.
    async fn execute_call(
        &self,
        tools: &[ToolDescriptor],
        call: &ToolCall,
    ) -> Result<String, AgentFailure> {
        let name = &call.function.name;

        let Some(tool) = tools.iter().find(|t| &t.name == name) else {
            eprintln!("[agent] model requested unbound tool: {}", name);
            return Ok(ToolOutcome::error(
                "unknown_tool",
                format!("Tool '{}' is not available in this mode", name),
            )
            .to_llm_text());
        };

        let args: Value = if call.function.arguments.trim().is_empty() {
            json!({})
        } else {
            match serde_json::from_str(&call.function.arguments) {
                Ok(v) => v,
                Err(e) => {
                    return Ok(ToolOutcome::error(
                        "invalid_arguments",
                        format!("Arguments were not valid JSON: {}", e),
                    )
                    .to_llm_text());
                }
            }
        };

        eprintln!("[agent] tool call: {}({})", name, args);

        match tool.invoker.invoke(args).await {
            Ok(outcome) => Ok(outcome.to_llm_text()),
            Err(e @ ToolError::Validation(_)) => {
                // Validation is a model-visible condition, not an infra failure
                Ok(ToolOutcome::error("validation", e.to_string()).to_llm_text())
            }
            Err(e) => Err(AgentFailure(anyhow!("tool {} failed: {}", name, e))),
        }
    }
}
