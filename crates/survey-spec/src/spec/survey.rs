use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::question::QuestionSpec;

/// Envelope the backend hands over when a survey is opened for answering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SurveyDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub survey: SurveySpec,
}

impl SurveyDocument {
    /// Parses a schema document, degrading to defaults instead of failing.
    ///
    /// The backend occasionally ships partial documents (missing attribute
    /// bags, absent descriptions); those render as an empty survey rather
    /// than an error surface.
    pub fn parse(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// Survey-level attribute bag. Only the global rule list matters to the
/// engine; everything else the backend sends is ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAttribute {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_rule: Vec<String>,
}

/// Top-level survey definition: title, description, ordered questions, and
/// survey-wide rules. Immutable once loaded for a session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SurveySpec {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attribute: SurveyAttribute,
    #[serde(default)]
    pub children: Vec<QuestionSpec>,
}

impl SurveySpec {
    pub fn question(&self, question_id: &str) -> Option<&QuestionSpec> {
        self.children
            .iter()
            .find(|question| question.id == question_id)
    }
}
