//! The tool server's tool registry: definitions and call dispatch.
//!
//! Validation failures and empty-store lookups come back as tool results
//! (structured data the model narrates), never as protocol errors; only
//! an unknown tool name or a broken store escalates.

use super::AppState;
use crate::errors::ToolError;
use crate::history;
use crate::mcp::ToolDef;
use crate::weather;
use serde_json::{json, Value};

/// Outcome of one tool call, before protocol framing
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    pub text: String,
    pub is_error: bool,
}

impl CallResult {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

fn no_args_def(name: &str, description: &str) -> ToolDef {
    ToolDef {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: json!({ "type": "object", "properties": {} }),
    }
}

/// Every tool this server advertises
pub fn tool_defs() -> Vec<ToolDef> {
    let mut defs = vec![
        ToolDef {
            name: "record_weight".to_string(),
            description: "Record a new weight entry for the user. Unit should be 'kg' or 'lbs'."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "weight": { "type": "number", "description": "The weight value to record" },
                    "unit": {
                        "type": "string",
                        "enum": ["kg", "lbs"],
                        "description": "The unit of measurement (default: 'kg')"
                    }
                },
                "required": ["weight"]
            }),
        },
        no_args_def(
            "get_weights",
            "Get all weight records ordered by timestamp (most recent first).",
        ),
        no_args_def("get_last_weight", "Get the most recent weight record."),
        no_args_def(
            "delete_all_weights",
            "Delete all weight records. Use with caution!",
        ),
        no_args_def(
            "get_history_britannica",
            "Get raw historical events from Britannica for today.",
        ),
        no_args_def(
            "get_history_today",
            "Get raw historical events from Wikipedia for today.",
        ),
        no_args_def(
            "get_history_on_this_day",
            "Get raw historical events from onthisday.com for today.",
        ),
        no_args_def(
            "get_current_weather_london",
            "Get the current weather in London.",
        ),
    ];

    for lang in crate::curriculum::LANGUAGES {
        defs.push(no_args_def(
            &format!("get_{}_topic", lang),
            &format!("Get the current {} topic the user is learning.", lang),
        ));
        defs.push(no_args_def(
            &format!("advance_{}_topic", lang),
            &format!("Advance to the next {} topic and return it.", lang),
        ));
        defs.push(no_args_def(
            &format!("reset_{}_progress", lang),
            &format!("Reset {} learning progress.", lang),
        ));
    }

    defs
}

/// Dispatch one `tools/call` to its handler.
pub async fn call(state: &AppState, name: &str, args: &Value) -> Result<CallResult, ToolError> {
    // Curriculum tools share one naming scheme across languages
    for lang in crate::curriculum::LANGUAGES {
        if name == format!("get_{}_topic", lang) {
            let v = state.curriculum.get_topic(lang)?;
            return Ok(CallResult::ok(v.to_string()));
        }
        if name == format!("advance_{}_topic", lang) {
            let v = state.curriculum.advance_topic(lang)?;
            return Ok(CallResult::ok(v.to_string()));
        }
        if name == format!("reset_{}_progress", lang) {
            let msg = state.curriculum.reset_progress(lang)?;
            return Ok(CallResult::ok(msg));
        }
    }

    match name {
        "record_weight" => {
            let Some(weight) = args.get("weight").and_then(Value::as_f64) else {
                return Ok(CallResult::error("Missing required 'weight' argument"));
            };
            let unit = args.get("unit").and_then(Value::as_str).unwrap_or("kg");

            match state.weights.record(weight, unit) {
                Ok(_) => Ok(CallResult::ok(format!("✅ Recorded: {} {}", weight, unit))),
                Err(ToolError::Validation(msg)) => Ok(CallResult::error(msg)),
                Err(e) => Err(e),
            }
        }
        "get_weights" => {
            let records = state.weights.list(None)?;
            Ok(CallResult::ok(serde_json::to_string(&records).map_err(
                |e| ToolError::Storage(format!("serialize weights: {}", e)),
            )?))
        }
        "get_last_weight" => match state.weights.last()? {
            Some(record) => Ok(CallResult::ok(
                serde_json::to_string(&record)
                    .map_err(|e| ToolError::Storage(format!("serialize weight: {}", e)))?,
            )),
            // A normal outcome, not a protocol error
            None => Ok(CallResult::ok(
                json!({ "error": "No weight records found" }).to_string(),
            )),
        },
        "delete_all_weights" => {
            let count = state.weights.delete_all()?;
            Ok(CallResult::ok(format!("Deleted {} records", count)))
        }
        "get_history_britannica" => Ok(CallResult::ok(history::get_history_britannica().await)),
        "get_history_today" => Ok(CallResult::ok(history::get_history_today().await)),
        "get_history_on_this_day" => {
            Ok(CallResult::ok(history::get_history_on_this_day().await))
        }
        "get_current_weather_london" => match weather::current_london_weather().await {
            Ok(v) => Ok(CallResult::ok(v.to_string())),
            Err(e) => Ok(CallResult::ok(
                json!({ "error": format!("Failed to fetch weather: {}", e) }).to_string(),
            )),
        },
        _ => Err(ToolError::Validation(format!("unknown tool: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::CurriculumService;
    use crate::store::progress::ProgressStore;
    use crate::store::weights::WeightStore;
    use crate::store::Db;

    fn test_state(dir: &std::path::Path) -> AppState {
        let db = Db::open_in_memory().unwrap();
        AppState {
            weights: WeightStore::new(db.clone()),
            curriculum: CurriculumService::new(dir.to_path_buf(), ProgressStore::new(db)),
        }
    }

    fn write_curriculum(dir: &std::path::Path, lang: &str, titles: &[&str]) {
        let topics: Vec<Value> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                json!({
                    "index": i + 1,
                    "section": "Basics",
                    "title": title,
                    "explanation": "...",
                    "exercise": "...",
                    "hint": "..."
                })
            })
            .collect();
        std::fs::write(
            dir.join(format!("{}_curriculum.json", lang)),
            serde_json::to_string(&topics).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn advertises_weight_history_weather_and_curriculum_tools() {
        let names: Vec<String> = tool_defs().into_iter().map(|d| d.name).collect();
        for expected in [
            "record_weight",
            "get_weights",
            "get_last_weight",
            "delete_all_weights",
            "get_history_today",
            "get_current_weather_london",
            "get_rust_topic",
            "advance_cpp_topic",
            "reset_python_progress",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {}", expected);
        }
        // 8 fixed + 3 per language
        assert_eq!(names.len(), 8 + 3 * 3);
    }

    #[tokio::test]
    async fn record_then_last_weight_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let res = call(&state, "record_weight", &json!({ "weight": 75.5, "unit": "kg" }))
            .await
            .unwrap();
        assert!(!res.is_error);
        assert_eq!(res.text, "✅ Recorded: 75.5 kg");

        let res = call(&state, "get_last_weight", &json!({})).await.unwrap();
        let record: Value = serde_json::from_str(&res.text).unwrap();
        assert_eq!(record["weight"], 75.5);
        assert_eq!(record["unit"], "kg");
    }

    #[tokio::test]
    async fn unit_defaults_to_kg() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        call(&state, "record_weight", &json!({ "weight": 70.0 }))
            .await
            .unwrap();
        let res = call(&state, "get_last_weight", &json!({})).await.unwrap();
        let record: Value = serde_json::from_str(&res.text).unwrap();
        assert_eq!(record["unit"], "kg");
    }

    #[tokio::test]
    async fn invalid_unit_is_a_tool_level_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let res = call(&state, "record_weight", &json!({ "weight": 75.0, "unit": "stone" }))
            .await
            .unwrap();
        assert!(res.is_error);
        assert!(res.text.contains("kg"));
    }

    #[tokio::test]
    async fn missing_weight_argument_is_a_tool_level_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let res = call(&state, "record_weight", &json!({})).await.unwrap();
        assert!(res.is_error);
    }

    #[tokio::test]
    async fn empty_store_last_weight_is_a_marker() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let res = call(&state, "get_last_weight", &json!({})).await.unwrap();
        assert!(!res.is_error);
        let v: Value = serde_json::from_str(&res.text).unwrap();
        assert_eq!(v["error"], "No weight records found");
    }

    #[tokio::test]
    async fn delete_all_reports_count_and_empties_list() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        for w in [80.0, 79.0] {
            call(&state, "record_weight", &json!({ "weight": w })).await.unwrap();
        }

        let res = call(&state, "delete_all_weights", &json!({})).await.unwrap();
        assert_eq!(res.text, "Deleted 2 records");

        let res = call(&state, "get_weights", &json!({})).await.unwrap();
        let list: Vec<Value> = serde_json::from_str(&res.text).unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn curriculum_tools_walk_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        write_curriculum(dir.path(), "rust", &["Ownership", "Borrowing"]);
        let state = test_state(dir.path());

        let res = call(&state, "get_rust_topic", &json!({})).await.unwrap();
        let v: Value = serde_json::from_str(&res.text).unwrap();
        assert_eq!(v["title"], "Ownership");

        let res = call(&state, "advance_rust_topic", &json!({})).await.unwrap();
        let v: Value = serde_json::from_str(&res.text).unwrap();
        assert_eq!(v["title"], "Borrowing");

        let res = call(&state, "advance_rust_topic", &json!({})).await.unwrap();
        let v: Value = serde_json::from_str(&res.text).unwrap();
        assert!(v["message"].as_str().unwrap().contains("Congratulations"));

        let res = call(&state, "reset_rust_progress", &json!({})).await.unwrap();
        assert!(res.text.contains("Rust progress successfully reset"));
    }

    #[tokio::test]
    async fn missing_curriculum_is_narratable() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let res = call(&state, "get_cpp_topic", &json!({})).await.unwrap();
        assert!(!res.is_error);
        let v: Value = serde_json::from_str(&res.text).unwrap();
        assert_eq!(v["error"], "Cpp curriculum not found");
    }

    #[tokio::test]
    async fn unknown_tool_escalates() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let err = call(&state, "make_coffee", &json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }
}
