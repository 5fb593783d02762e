//! Configuration: defaults, optional TOML file, environment overrides.
//!
//! Precedence, lowest to highest: built-in defaults, config file, env
//! vars. Env names match the original deployment (OPENROUTER_API_KEY,
//! OPENROUTER_MODEL, MCP_SERVER_URL) so docker-compose setups carry over.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-lite-preview-02-05:free";
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MCP_URL: &str = "http://127.0.0.1:8600/rpc";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_mcp_url() -> String {
    DEFAULT_MCP_URL.to_string()
}

fn default_discovery_attempts() -> u32 {
    5
}

fn default_discovery_backoff_secs() -> u64 {
    5
}

fn default_agent_timeout_secs() -> u64 {
    60
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".polybot")
        .join("polybot.db")
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_mcp_url")]
    pub mcp_url: String,
    #[serde(default = "default_discovery_attempts")]
    pub discovery_attempts: u32,
    #[serde(default = "default_discovery_backoff_secs")]
    pub discovery_backoff_secs: u64,
    #[serde(default = "default_agent_timeout_secs")]
    pub agent_timeout_secs: u64,
    /// Directory holding <lang>_curriculum.json files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        // An empty TOML document yields pure defaults
        toml::from_str("").expect("defaults are valid")
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut cfg: Config =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn load() -> Self {
        let mut cfg = Config::default();
        cfg.apply_env();
        cfg
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            self.api_key = key;
        }
        if let Ok(model) = std::env::var("OPENROUTER_MODEL") {
            self.model = model;
        }
        if let Ok(url) = std::env::var("MCP_SERVER_URL") {
            self.mcp_url = url;
        }
        if let Ok(dir) = std::env::var("CURRICULUM_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("POLYBOT_DB") {
            self.db_path = PathBuf::from(path);
        }
    }

    pub fn discovery_backoff(&self) -> Duration {
        Duration::from_secs(self.discovery_backoff_secs)
    }

    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }
}
