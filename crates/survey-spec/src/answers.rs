use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Answers keyed by question id. Each entry is itself an object mapping
/// option/sub-field ids to values, matching the submission wire format.
pub type AnswerMap = Map<String, Value>;

/// First string value found under an answer entry, in key order. Radio and
/// fill-in answers hold exactly one; for checkbox answers this is simply
/// the first checked option's label.
pub fn first_scalar(entry: &Value) -> Option<&str> {
    entry
        .as_object()?
        .values()
        .find_map(|value| value.as_str())
}

/// Inserts `value` at `answers[question_id][sub_id]`, creating the nested
/// object as needed.
pub fn merge_entry(answers: &mut AnswerMap, question_id: &str, sub_id: &str, value: Value) {
    let entry = answers
        .entry(question_id.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Some(object) = entry.as_object_mut() {
        object.insert(sub_id.to_string(), value);
    }
}

/// A value counts as present when it carries visible content. Empty
/// strings and empty objects come from cleared inputs and unchecked
/// inline blanks.
pub fn value_present(value: &Value) -> bool {
    match value {
        Value::String(text) => !text.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
        _ => true,
    }
}

/// Final assembled submission: the full answer map plus the metadata the
/// submission sink expects alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnswerSet {
    pub survey_id: String,
    pub answers: Value,
    /// Milliseconds between first render and submission.
    pub elapsed_ms: u64,
}

impl AnswerSet {
    pub fn new(survey_id: impl Into<String>, answers: AnswerMap, elapsed_ms: u64) -> Self {
        Self {
            survey_id: survey_id.into(),
            answers: Value::Object(answers),
            elapsed_ms,
        }
    }

    /// Serializes the submission as indented JSON for logging and the CLI.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
