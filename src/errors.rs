//! Error taxonomy shared across the dispatcher and tool layers.
//!
//! Tool-level conditions that the model should narrate (validation
//! failures, empty stores, finished curricula) are NOT represented here;
//! those travel as structured payloads inside successful tool results.
//! These types cover the failures that cross component boundaries.

use thiserror::Error;

/// Failure of a single agent invocation (model call or tool round trip).
///
/// Recovered at the dispatcher boundary into a user-facing apology; the
/// underlying cause is logged, never shown to the end user.
#[derive(Debug, Error)]
#[error("agent failure: {0}")]
pub struct AgentFailure(#[from] pub anyhow::Error);

/// Errors surfaced by the dispatcher public API.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The requested persona id is not in the current catalog.
    #[error("unknown persona: {0}")]
    UnknownPersona(String),

    /// `dispatch` was called before `initialize` completed.
    #[error("dispatcher not initialized")]
    NotInitialized,

    /// The persona's agent failed or timed out.
    #[error(transparent)]
    Agent(#[from] AgentFailure),
}

/// Errors from tool invocation and the stores behind it.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Input rejected before reaching storage.
    #[error("validation: {0}")]
    Validation(String),

    /// Persistence layer unreachable or corrupt.
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// Network-level failure talking to a remote endpoint.
    #[error("transport: {0}")]
    Transport(String),
}

impl From<rusqlite::Error> for ToolError {
    fn from(e: rusqlite::Error) -> Self {
        ToolError::Storage(e.to_string())
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        ToolError::Transport(e.to_string())
    }
}
