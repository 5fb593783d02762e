//! Polybot - a persona-switching chat assistant
//!
//! This library provides the core functionality for the polybot
//! assistant daemon and the polybot-tools tool server.

pub mod agent;
pub mod config;
pub mod curriculum;
pub mod dispatcher;
pub mod errors;
pub mod history;
pub mod llm;
pub mod mcp;
pub mod persona;
pub mod retry;
pub mod server;
pub mod store;
pub mod tool_filter;
pub mod tools;
pub mod weather;

#[cfg(test)]
pub mod test_utils;
