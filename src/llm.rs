//! OpenAI-compatible chat client (OpenRouter by default).

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

// Retry configuration for rate limiting and transient errors
const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second
const MAX_BACKOFF_MS: u64 = 60000; // 60 seconds

/// Check if an HTTP status code is retryable (429 rate limit or 5xx server error)
fn is_retryable_status(code: u16) -> bool {
    code == 429 || (500..600).contains(&code)
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Message,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Trait for LLM clients to allow mocking and abstraction
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

pub struct Client {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        })
    }
}

#[async_trait]
impl LlmClient for Client {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut attempt = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            attempt += 1;

            let resp = self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(request)
                .send()
                .await;

            match resp {
                Ok(r) if r.status().is_success() => {
                    return Ok(r.json::<ChatResponse>().await?);
                }
                Ok(r) if is_retryable_status(r.status().as_u16()) => {
                    let code = r.status().as_u16();

                    // Check for Retry-After header (common in 429 responses)
                    let retry_after = r
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .map(|s| s * 1000);

                    if attempt >= MAX_RETRIES {
                        let body = r.text().await.unwrap_or_default();
                        return Err(anyhow!(
                            "API error {} after {} retries: {}",
                            code,
                            MAX_RETRIES,
                            body
                        ));
                    }

                    let wait_ms = retry_after.unwrap_or(backoff_ms).min(MAX_BACKOFF_MS);

                    eprintln!(
                        "[llm] {} error, retrying in {}ms (attempt {}/{})",
                        code, wait_ms, attempt, MAX_RETRIES
                    );

                    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                }
                Ok(r) => {
                    // Non-retryable HTTP error (4xx except 429)
                    let code = r.status().as_u16();
                    let body = r.text().await.unwrap_or_default();
                    return Err(anyhow!("API error {}: {}", code, body));
                }
                Err(e) => {
                    // Connection/network error - retryable
                    if attempt >= MAX_RETRIES {
                        return Err(anyhow!(
                            "Connection error after {} retries: {}",
                            MAX_RETRIES,
                            e
                        ));
                    }

                    eprintln!(
                        "[llm] Connection error, retrying in {}ms (attempt {}/{}): {}",
                        backoff_ms, attempt, MAX_RETRIES, e
                    );

                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                }
            }
        }
    }
}
