#![allow(missing_docs)]

pub mod answers;
pub mod rules;
pub mod spec;
pub mod visibility;

pub use answers::{AnswerMap, AnswerSet, first_scalar, merge_entry, value_present};
pub use rules::{
    AnswerRef, CmpOp, ConditionItem, ConditionLogic, GlobalOutcome, GlobalRule, RuleExpr,
    StructuredRule, evaluate_global_rules, jump_destination,
};
pub use spec::{
    OptionAttribute, OptionSpec, QuestionAttribute, QuestionSpec, QuestionType, SurveyAttribute,
    SurveyDocument, SurveySpec,
};
pub use visibility::{AUTO_MEDIA_TITLE, LOCATION_TITLE, VisibleSet};
