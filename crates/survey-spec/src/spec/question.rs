use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Question type tags as they appear on the wire. Unknown tags map to
/// [`QuestionType::Other`] and render as a generic text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub enum QuestionType {
    FillBlank,
    Textarea,
    Radio,
    Checkbox,
    Select,
    MultipleBlank,
    Score,
    Nps,
    Cascader,
    Upload,
    Signature,
    Barcode,
    #[default]
    #[serde(other)]
    Other,
}

impl QuestionType {
    /// Score and NPS sliders share collection and answered semantics.
    pub fn is_slider(self) -> bool {
        matches!(self, QuestionType::Score | QuestionType::Nps)
    }
}

/// Per-question attribute bag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAttribute {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_rule: Option<String>,
}

/// Definition of a single question inside a survey.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attribute: QuestionAttribute,
    #[serde(default)]
    pub children: Vec<OptionSpec>,
}

impl QuestionSpec {
    /// `attribute.display == "hidden"` removes the question from the paginated set.
    pub fn is_hidden(&self) -> bool {
        self.attribute.display.as_deref() == Some("hidden")
    }

    pub fn is_required(&self) -> bool {
        self.attribute.required
    }

    pub fn option(&self, option_id: &str) -> Option<&OptionSpec> {
        self.children.iter().find(|option| option.id == option_id)
    }

    /// Sub-field id answers for this question are stored under: the text
    /// of a fill-blank, or the array of uploaded file ids. The last child
    /// with an id wins, matching the submission format.
    pub fn sub_field(&self) -> Option<&str> {
        self.children
            .iter()
            .rev()
            .find(|child| !child.id.is_empty())
            .map(|child| child.id.as_str())
    }
}

/// Attribute bag for an option row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

/// Option or sub-field belonging to a question. For choice questions this
/// is a selectable row; for fill-in questions it names the blank.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct OptionSpec {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub attribute: OptionAttribute,
    #[serde(default)]
    pub children: Vec<OptionSpec>,
}

impl OptionSpec {
    /// Options tagged `horzBlank` carry a text input next to the choice,
    /// active only while the choice is selected.
    pub fn has_inline_blank(&self) -> bool {
        self.attribute.data_type.as_deref() == Some("horzBlank")
    }

    /// Id of the inline blank's text input, taken from the first child.
    pub fn inline_blank_id(&self) -> Option<&str> {
        self.children.first().map(|child| child.id.as_str())
    }

    /// Display label with the blank placeholder underscores stripped.
    pub fn inline_label(&self) -> String {
        self.title.replace("____________", "")
    }
}
