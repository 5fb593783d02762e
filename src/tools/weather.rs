//! Local weather tool, always available to the general persona even when
//! tool discovery fails.

use super::{empty_schema, ToolDescriptor, ToolInvoker, ToolOutcome};
use crate::errors::ToolError;
use crate::weather;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub const TOOL_NAME: &str = "get_current_weather_london";

struct WeatherInvoker;

#[async_trait]
impl ToolInvoker for WeatherInvoker {
    async fn invoke(&self, _args: Value) -> Result<ToolOutcome, ToolError> {
        match weather::current_london_weather().await {
            Ok(v) => Ok(ToolOutcome::Json(v)),
            // Narrated to the user by the model rather than failing the turn
            Err(e) => Ok(ToolOutcome::error("weather_unavailable", e.to_string())),
        }
    }
}

/// Build the local weather tool descriptor
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        TOOL_NAME,
        "Get the current weather in London.",
        empty_schema(),
        Arc::new(WeatherInvoker),
    )
}
