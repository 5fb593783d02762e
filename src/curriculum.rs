//! Static per-language curricula and the progress state machine over them.
//!
//! Topic payload shapes match what the tutor personas expect to narrate:
//! a topic view, an "all topics completed" marker, a congratulations
//! message on finishing, or a "curriculum not found" marker. All of these
//! are normal outcomes returned as structured data; only storage failures
//! are errors.

use crate::errors::ToolError;
use crate::store::progress::ProgressStore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Languages with a curriculum
pub const LANGUAGES: &[&str] = &["rust", "cpp", "python"];

/// One ordered learning topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub index: u32,
    pub section: String,
    pub title: String,
    pub explanation: String,
    pub exercise: String,
    pub hint: String,
}

/// A language's ordered topic list, read-only at runtime
#[derive(Debug, Clone)]
pub struct Curriculum {
    pub language: String,
    pub topics: Vec<Topic>,
}

impl Curriculum {
    /// Load `<dir>/<language>_curriculum.json`. A missing or unreadable
    /// file is a recoverable condition surfaced by the caller, not a
    /// crash.
    pub fn load(dir: &Path, language: &str) -> Option<Self> {
        let path = dir.join(format!("{}_curriculum.json", language));
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!(
                    "[curriculum] not found for {} at {}: {}",
                    language,
                    path.display(),
                    e
                );
                return None;
            }
        };
        match serde_json::from_str::<Vec<Topic>>(&raw) {
            Ok(topics) => Some(Self {
                language: language.to_string(),
                topics,
            }),
            Err(e) => {
                eprintln!("[curriculum] invalid JSON at {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn topic_payload(curriculum: &Curriculum, index: usize) -> Value {
    let topic = &curriculum.topics[index];
    json!({
        "index": topic.index,
        "section": topic.section,
        "title": topic.title,
        "explanation": topic.explanation,
        "exercise": topic.exercise,
        "hint": topic.hint,
        "current_index": index + 1,
        "total_topics": curriculum.len(),
        "language": curriculum.language,
    })
}

fn completed_payload(language: &str, index: i64, total: usize) -> Value {
    json!({
        "error": "All topics completed",
        "language": language,
        "current_index": index,
        "total_topics": total,
    })
}

fn not_found_payload(language: &str) -> Value {
    json!({ "error": format!("{} curriculum not found", capitalize(language)) })
}

/// Curriculum tools' backing service: topic lookup driven by the durable
/// per-language progress index.
#[derive(Clone)]
pub struct CurriculumService {
    dir: PathBuf,
    progress: ProgressStore,
}

impl CurriculumService {
    pub fn new(dir: PathBuf, progress: ProgressStore) -> Self {
        Self { dir, progress }
    }

    /// Current topic for a language. Read-only.
    pub fn get_topic(&self, language: &str) -> Result<Value, ToolError> {
        let Some(curriculum) = Curriculum::load(&self.dir, language) else {
            return Ok(not_found_payload(language));
        };
        if curriculum.is_empty() {
            return Ok(not_found_payload(language));
        }

        let index = self.progress.current(language)?;
        if index >= curriculum.len() as i64 {
            return Ok(completed_payload(language, index, curriculum.len()));
        }

        Ok(topic_payload(&curriculum, index as usize))
    }

    /// Advance to the next topic and return it.
    ///
    /// At the end of the curriculum this is a no-op completion marker;
    /// crossing the end returns a congratulations message instead of a
    /// topic (there is no topic at index N).
    pub fn advance_topic(&self, language: &str) -> Result<Value, ToolError> {
        let Some(curriculum) = Curriculum::load(&self.dir, language) else {
            return Ok(not_found_payload(language));
        };
        if curriculum.is_empty() {
            return Ok(not_found_payload(language));
        }

        let total = curriculum.len() as i64;
        if self.progress.current(language)? >= total {
            return Ok(completed_payload(
                language,
                self.progress.current(language)?,
                curriculum.len(),
            ));
        }

        let new_index = self.progress.advance_clamped(language, total)?;
        if new_index >= total {
            return Ok(json!({
                "message": format!(
                    "Congratulations! You've completed all {} topics!",
                    capitalize(language)
                ),
                "language": language,
                "current_index": new_index,
                "total_topics": curriculum.len(),
            }));
        }

        Ok(topic_payload(&curriculum, new_index as usize))
    }

    /// Reset a language's progress to the first topic.
    pub fn reset_progress(&self, language: &str) -> Result<String, ToolError> {
        self.progress.reset(language)?;
        Ok(format!(
            "{} progress successfully reset. Ready to start fresh!",
            capitalize(language)
        ))
    }
}
