pub mod question;
pub mod survey;

pub use question::{OptionAttribute, OptionSpec, QuestionAttribute, QuestionSpec, QuestionType};
pub use survey::{SurveyAttribute, SurveyDocument, SurveySpec};
