pub mod expr;
pub mod global;

pub use expr::{AnswerRef, CmpOp, RuleExpr, jump_destination};
pub use global::{
    ConditionItem, ConditionLogic, GlobalOutcome, GlobalRule, RuleAction, StructuredRule,
    evaluate_global_rules,
};
