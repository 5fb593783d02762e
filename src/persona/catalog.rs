//! Persona catalog construction.

use super::{prompts, Persona, PersonaSummary};
use super::{PERSONA_CPP, PERSONA_GENERAL, PERSONA_PYTHON, PERSONA_RUST, PERSONA_WEIGHT};
use crate::tool_filter::PartitionedTools;
use crate::tools::ToolDescriptor;
use std::collections::HashMap;

/// The full set of personas for one discovery epoch.
///
/// Built in one shot and shared behind an `Arc`; readers never observe a
/// partially constructed catalog because replacement swaps the whole
/// reference.
#[derive(Debug, Clone, Default)]
pub struct PersonaCatalog {
    ordered: Vec<String>,
    by_id: HashMap<String, Persona>,
}

impl PersonaCatalog {
    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Summaries in fixed display order
    pub fn list(&self) -> Vec<PersonaSummary> {
        self.ordered
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .map(Persona::summary)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn insert(&mut self, persona: Persona) {
        self.ordered.push(persona.id.clone());
        self.by_id.insert(persona.id.clone(), persona);
    }
}

/// Build all five personas from partitioned remote tools plus the
/// always-available local tools.
///
/// general = local tools + history group; the other personas get exactly
/// their own group. Empty groups produce degraded but invocable personas.
pub fn build_catalog(
    partitioned: &PartitionedTools,
    local_tools: &[ToolDescriptor],
) -> PersonaCatalog {
    let mut catalog = PersonaCatalog::default();

    let mut general_tools = local_tools.to_vec();
    general_tools.extend(partitioned.history.iter().cloned());

    catalog.insert(Persona {
        id: PERSONA_GENERAL.to_string(),
        display_name: "General".to_string(),
        description: "A helpful assistant for general queries, weather, and history.".to_string(),
        instructions: prompts::GENERAL.to_string(),
        tools: general_tools,
    });

    catalog.insert(Persona {
        id: PERSONA_WEIGHT.to_string(),
        display_name: "Weight Tracker".to_string(),
        description: "Focused on tracking and visualizing weight loss progress.".to_string(),
        instructions: prompts::WEIGHT.to_string(),
        tools: partitioned.weight.clone(),
    });

    catalog.insert(Persona {
        id: PERSONA_RUST.to_string(),
        display_name: "Rust Tutor".to_string(),
        description: "An interactive Rust programming language tutor.".to_string(),
        instructions: prompts::RUST.to_string(),
        tools: partitioned.rust.clone(),
    });

    catalog.insert(Persona {
        id: PERSONA_CPP.to_string(),
        display_name: "C++ Tutor".to_string(),
        description: "An interactive C++ programming language tutor.".to_string(),
        instructions: prompts::CPP.to_string(),
        tools: partitioned.cpp.clone(),
    });

    catalog.insert(Persona {
        id: PERSONA_PYTHON.to_string(),
        display_name: "Python Tutor".to_string(),
        description: "An interactive Python programming language tutor.".to_string(),
        instructions: prompts::PYTHON.to_string(),
        tools: partitioned.python.clone(),
    });

    catalog
}
