//! Tool discovery with bounded retry.
//!
//! Runs once at startup, before the dispatcher accepts traffic. Failure
//! is soft: the bot comes up with degraded personas rather than aborting.

use super::client::{into_descriptors, McpClient};
use super::ToolDef;
use crate::errors::ToolError;
use crate::retry::{with_retry, RetryPolicy};
use crate::tools::ToolDescriptor;
use std::future::Future;
use std::sync::Arc;

/// Discover the tool server's advertised tools, retrying with a fixed
/// delay. Returns an empty list after exhausting attempts.
pub async fn discover_tools(client: Arc<McpClient>, policy: RetryPolicy) -> Vec<ToolDescriptor> {
    let defs = discover_with(policy, || {
        let client = client.clone();
        async move {
            client.initialize().await?;
            client.list_tools().await
        }
    })
    .await;

    into_descriptors(client, defs)
}

/// Retry loop over an arbitrary lister, separated from the HTTP client so
/// the policy is testable without a server.
pub(crate) async fn discover_with<Op, Fut>(policy: RetryPolicy, mut op: Op) -> Vec<ToolDef>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<ToolDef>, ToolError>>,
{
    let attempts = policy.max_attempts;
    let result = with_retry(
        policy,
        |attempt| {
            let fut = op();
            async move {
                match fut.await {
                    // An empty list is a failed attempt: the server may
                    // still be starting up
                    Ok(defs) if defs.is_empty() => {
                        eprintln!(
                            "[discover] attempt {}/{}: server advertised no tools",
                            attempt, attempts
                        );
                        Err(ToolError::Transport("empty tool list".into()))
                    }
                    Ok(defs) => {
                        eprintln!(
                            "[discover] loaded {} tools from tool server",
                            defs.len()
                        );
                        Ok(defs)
                    }
                    Err(e) => {
                        eprintln!("[discover] attempt {}/{} failed: {}", attempt, attempts, e);
                        Err(e)
                    }
                }
            }
        },
        |d| tokio::time::sleep(d),
    )
    .await;

    match result {
        Ok(defs) => defs,
        Err(_) => {
            eprintln!("[discover] all attempts failed; continuing with no remote tools");
            Vec::new()
        }
    }
}
