//! Personas: named bundles of instructions plus a tool subset.
//!
//! Five fixed personas exist (general, weight, rust, cpp, python). Each is
//! immutable once built; the catalog is rebuilt wholesale when tools are
//! (re)discovered and swapped in atomically.

pub mod catalog;
pub mod prompts;

pub use catalog::{build_catalog, PersonaCatalog};

use crate::tools::ToolDescriptor;

pub const PERSONA_GENERAL: &str = "general";
pub const PERSONA_WEIGHT: &str = "weight";
pub const PERSONA_RUST: &str = "rust";
pub const PERSONA_CPP: &str = "cpp";
pub const PERSONA_PYTHON: &str = "python";

/// Stable persona ids, in display order
pub const PERSONA_IDS: &[&str] = &[
    PERSONA_GENERAL,
    PERSONA_WEIGHT,
    PERSONA_RUST,
    PERSONA_CPP,
    PERSONA_PYTHON,
];

/// One interaction mode: instructions plus the tools the model may call
#[derive(Debug, Clone)]
pub struct Persona {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub instructions: String,
    pub tools: Vec<ToolDescriptor>,
}

/// Public listing entry for `list_personas`
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PersonaSummary {
    pub id: String,
    pub display_name: String,
    pub description: String,
}

impl Persona {
    pub fn summary(&self) -> PersonaSummary {
        PersonaSummary {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            description: self.description.clone(),
        }
    }
}
