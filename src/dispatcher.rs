//! Message dispatch: user id -> active persona -> agent invocation.
//!
//! The catalog is shared behind an `Arc` and replaced wholesale when tools
//! are rediscovered; the per-user mode map is a concurrent map keyed by
//! user id. Both are safe under concurrent dispatch from many tasks.

use crate::agent::AgentRunner;
use crate::errors::{AgentFailure, DispatchError};
use crate::mcp::client::McpClient;
use crate::mcp::discover::discover_tools;
use crate::persona::{build_catalog, PersonaCatalog, PersonaSummary, PERSONA_GENERAL};
use crate::retry::RetryPolicy;
use crate::tool_filter::partition;
use crate::tools::ToolDescriptor;
use anyhow::anyhow;
use dashmap::DashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Default timeout for one agent invocation
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Dispatcher {
    catalog: RwLock<Option<Arc<PersonaCatalog>>>,
    modes: DashMap<String, String>,
    runner: AgentRunner,
    local_tools: Vec<ToolDescriptor>,
    agent_timeout: Duration,
}

impl Dispatcher {
    pub fn new(runner: AgentRunner, local_tools: Vec<ToolDescriptor>) -> Self {
        Self {
            catalog: RwLock::new(None),
            modes: DashMap::new(),
            runner,
            local_tools,
            agent_timeout: DEFAULT_AGENT_TIMEOUT,
        }
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    /// Discover remote tools and build the persona catalog.
    ///
    /// Idempotent: re-running replaces the catalog atomically. Must
    /// complete before the first `dispatch`. Discovery failure degrades
    /// (personas without tools) rather than failing initialization.
    pub async fn initialize(&self, mcp: Arc<McpClient>, policy: RetryPolicy) {
        let discovered = discover_tools(mcp, policy).await;
        self.install_tools(&discovered);
    }

    /// Partition discovered tools and swap in a freshly built catalog.
    pub fn install_tools(&self, discovered: &[ToolDescriptor]) {
        let catalog = build_catalog(&partition(discovered), &self.local_tools);
        eprintln!(
            "[dispatch] catalog installed: {} personas, {} discovered tools",
            catalog.len(),
            discovered.len()
        );
        *self.catalog.write().expect("catalog lock") = Some(Arc::new(catalog));
    }

    fn current_catalog(&self) -> Option<Arc<PersonaCatalog>> {
        self.catalog.read().expect("catalog lock").clone()
    }

    /// Switch a user's active persona.
    pub fn set_mode(&self, user_id: &str, persona_id: &str) -> Result<(), DispatchError> {
        let catalog = self
            .current_catalog()
            .ok_or(DispatchError::NotInitialized)?;

        if !catalog.contains(persona_id) {
            return Err(DispatchError::UnknownPersona(persona_id.to_string()));
        }

        self.modes
            .insert(user_id.to_string(), persona_id.to_string());
        Ok(())
    }

    /// Resolve a user's active persona id.
    ///
    /// Falls back to the default for unknown users, and self-heals (without
    /// erasing the entry) when a stored id is no longer in the catalog.
    pub fn get_mode(&self, user_id: &str) -> String {
        let stored = self.modes.get(user_id).map(|r| r.value().clone());

        match (stored, self.current_catalog()) {
            (Some(id), Some(catalog)) if catalog.contains(&id) => id,
            _ => PERSONA_GENERAL.to_string(),
        }
    }

    /// Personas available for mode switching, in display order.
    pub fn list_personas(&self) -> Vec<PersonaSummary> {
        self.current_catalog()
            .map(|c| c.list())
            .unwrap_or_default()
    }

    /// Route one message to the user's active persona and run its agent.
    pub async fn dispatch(&self, user_id: &str, text: &str) -> Result<String, DispatchError> {
        let catalog = self
            .current_catalog()
            .ok_or(DispatchError::NotInitialized)?;

        let persona_id = self.get_mode(user_id);
        let persona = catalog
            .get(&persona_id)
            .ok_or(DispatchError::NotInitialized)?;

        eprintln!("[dispatch] user={} persona={}", user_id, persona_id);

        match tokio::time::timeout(
            self.agent_timeout,
            self.runner
                .invoke(&persona.instructions, &persona.tools, text),
        )
        .await
        {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(e)) => {
                eprintln!("[dispatch] agent failed for user {}: {}", user_id, e);
                Err(DispatchError::Agent(e))
            }
            Err(_) => {
                eprintln!(
                    "[dispatch] agent timed out after {:?} for user {}",
                    self.agent_timeout, user_id
                );
                Err(DispatchError::Agent(AgentFailure(anyhow!(
                    "agent invocation timed out"
                ))))
            }
        }
    }

    #[cfg(test)]
    fn force_mode(&self, user_id: &str, persona_id: &str) {
        self.modes
            .insert(user_id.to_string(), persona_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockLlmClient;
    use crate::tools::testing::stub_tool;

    fn dispatcher_with(responses: Vec<crate::llm::ChatResponse>) -> Dispatcher {
        let llm = Arc::new(MockLlmClient::new(responses));
        let runner = AgentRunner::new(llm, "test-model");
        Dispatcher::new(runner, vec![stub_tool("get_current_weather_london")])
    }

    #[test]
    fn get_mode_defaults_to_general() {
        let d = dispatcher_with(vec![]);
        d.install_tools(&[]);
        assert_eq!(d.get_mode("alice"), "general");
    }

    #[test]
    fn set_then_get_mode() {
        let d = dispatcher_with(vec![]);
        d.install_tools(&[]);

        d.set_mode("alice", "weight").unwrap();
        assert_eq!(d.get_mode("alice"), "weight");

        // Other users are unaffected
        assert_eq!(d.get_mode("bob"), "general");
    }

    #[test]
    fn unknown_persona_rejected_and_mode_unchanged() {
        let d = dispatcher_with(vec![]);
        d.install_tools(&[]);

        d.set_mode("alice", "rust").unwrap();
        let err = d.set_mode("alice", "bogus").unwrap_err();
        assert!(matches!(err, DispatchError::UnknownPersona(ref id) if id == "bogus"));
        assert_eq!(d.get_mode("alice"), "rust");
    }

    #[test]
    fn stale_mode_falls_back_without_erasing() {
        let d = dispatcher_with(vec![]);
        d.install_tools(&[]);

        d.force_mode("alice", "retired-persona");
        assert_eq!(d.get_mode("alice"), "general");
        // Entry is still present, only resolution falls back
        assert_eq!(
            d.modes.get("alice").map(|r| r.value().clone()),
            Some("retired-persona".to_string())
        );
    }

    #[test]
    fn set_mode_before_initialize_is_an_error() {
        let d = dispatcher_with(vec![]);
        assert!(matches!(
            d.set_mode("alice", "weight"),
            Err(DispatchError::NotInitialized)
        ));
    }

    #[test]
    fn list_personas_in_order() {
        let d = dispatcher_with(vec![]);
        d.install_tools(&[stub_tool("record_weight")]);

        let ids: Vec<String> = d.list_personas().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["general", "weight", "rust", "cpp", "python"]);
    }

    #[test]
    fn list_personas_empty_before_initialize() {
        let d = dispatcher_with(vec![]);
        assert!(d.list_personas().is_empty());
    }

    #[tokio::test]
    async fn dispatch_before_initialize_is_an_error() {
        let d = dispatcher_with(vec![MockLlmClient::response_with_content("hi")]);
        assert!(matches!(
            d.dispatch("alice", "hello").await,
            Err(DispatchError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn dispatch_routes_to_active_persona() {
        let llm = Arc::new(MockLlmClient::new(vec![
            MockLlmClient::response_with_content("🦀 Let's learn ownership!"),
        ]));
        let runner = AgentRunner::new(llm.clone(), "test-model");
        let d = Dispatcher::new(runner, vec![]);
        d.install_tools(&[stub_tool("get_rust_topic")]);

        d.set_mode("alice", "rust").unwrap();
        let answer = d.dispatch("alice", "teach me").await.unwrap();
        assert_eq!(answer, "🦀 Let's learn ownership!");

        // The rust persona's instructions and toolset were used
        let request = &llm.requests()[0];
        let system = request.messages[0]["content"].as_str().unwrap();
        assert!(system.contains("Rust Programming Tutor"));
        let schemas = request.tools.as_ref().unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0]["function"]["name"], "get_rust_topic");
    }

    #[tokio::test]
    async fn agent_timeout_surfaces_as_agent_failure() {
        struct SlowLlm;

        #[async_trait::async_trait]
        impl crate::llm::LlmClient for SlowLlm {
            async fn chat(
                &self,
                _request: &crate::llm::ChatRequest,
            ) -> anyhow::Result<crate::llm::ChatResponse> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(MockLlmClient::response_with_content("too late"))
            }
        }

        let runner = AgentRunner::new(Arc::new(SlowLlm), "test-model");
        let d = Dispatcher::new(runner, vec![])
            .with_agent_timeout(Duration::from_millis(20));
        d.install_tools(&[]);

        let err = d.dispatch("alice", "hello").await.unwrap_err();
        assert!(matches!(err, DispatchError::Agent(_)));
    }
}
