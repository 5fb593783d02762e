//! Partitioning of discovered tools into persona groups.
//!
//! Routing is by keyword substring on the tool name, evaluated in a fixed
//! priority order (weight, rust, cpp, python, history). First match wins,
//! so a tool lands in at most one group. This is a deliberate policy: a
//! name like "rust_history" is a rust-tutor tool, not a history tool.
//! Tools matching no rule are dropped; the general persona gets its tools
//! by explicit enumeration, not as a catch-all.

use crate::tools::ToolDescriptor;

/// Persona-specific tool groups produced by [`partition`].
#[derive(Debug, Default, Clone)]
pub struct PartitionedTools {
    pub weight: Vec<ToolDescriptor>,
    pub rust: Vec<ToolDescriptor>,
    pub cpp: Vec<ToolDescriptor>,
    pub python: Vec<ToolDescriptor>,
    pub history: Vec<ToolDescriptor>,
}

impl PartitionedTools {
    /// Total number of tools routed into any group
    pub fn routed_count(&self) -> usize {
        self.weight.len()
            + self.rust.len()
            + self.cpp.len()
            + self.python.len()
            + self.history.len()
    }
}

fn group_for(name: &str) -> Option<usize> {
    // Priority order is part of the contract; do not reorder.
    const RULES: &[&[&str]] = &[
        &["weight", "data"], // weight
        &["rust"],           // rust
        &["cpp"],            // cpp
        &["python"],         // python
        &["history"],        // history
    ];

    RULES
        .iter()
        .position(|keywords| keywords.iter().any(|kw| name.contains(kw)))
}

/// Partition a discovered tool list into persona groups.
///
/// Pure function: no side effects, input order within each group is
/// preserved. An empty input yields empty groups, which callers must treat
/// as degraded-but-usable (personas simply have no tools).
pub fn partition(tools: &[ToolDescriptor]) -> PartitionedTools {
    let mut out = PartitionedTools::default();

    for tool in tools {
        match group_for(&tool.name) {
            Some(0) => out.weight.push(tool.clone()),
            Some(1) => out.rust.push(tool.clone()),
            Some(2) => out.cpp.push(tool.clone()),
            Some(3) => out.python.push(tool.clone()),
            Some(4) => out.history.push(tool.clone()),
            _ => {} // unmatched tools are dropped
        }
    }

    out
}
