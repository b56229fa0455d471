use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::AnswerMap;
use crate::rules::expr::RuleExpr;
use crate::visibility::VisibleSet;

/// Combinator applied across a structured rule's condition clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionLogic {
    #[default]
    And,
    Or,
}

/// One "question has option checked" clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionItem {
    #[serde(default)]
    pub q_id: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub o_id: Vec<String>,
}

impl ConditionItem {
    /// Only the `CHECKED` condition is defined by the rule format; other
    /// condition strings never hold.
    fn holds(&self, answers: &AnswerMap) -> bool {
        if self.condition != "CHECKED" {
            return false;
        }
        let Some(entry) = answers.get(&self.q_id) else {
            return false;
        };
        self.o_id
            .iter()
            .any(|option_id| entry.get(option_id).is_some())
    }
}

/// Action taken when a structured rule's condition holds. Only `jump`
/// actions are meaningful to the navigation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleAction {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub q_id: String,
}

/// Structured condition→result rule. Both `conditionItem` and `result`
/// must be present for a rule string to parse as structured; anything
/// else is treated as a raw expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StructuredRule {
    pub condition_item: Vec<ConditionItem>,
    #[serde(default)]
    pub condition_logic: ConditionLogic,
    pub result: Vec<RuleAction>,
}

impl StructuredRule {
    pub fn condition_holds(&self, answers: &AnswerMap) -> bool {
        match self.condition_logic {
            ConditionLogic::And => self.condition_item.iter().all(|item| item.holds(answers)),
            ConditionLogic::Or => self.condition_item.iter().any(|item| item.holds(answers)),
        }
    }

    pub fn jump_target(&self) -> Option<&str> {
        self.result
            .iter()
            .find(|action| action.kind == "jump")
            .map(|action| action.q_id.as_str())
    }
}

/// A survey-level rule: either a structured condition object or a raw
/// boolean expression over answer references.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalRule {
    Structured(StructuredRule),
    Expression(String),
}

impl GlobalRule {
    pub fn parse(raw: &str) -> GlobalRule {
        match serde_json::from_str::<StructuredRule>(raw) {
            Ok(rule) => GlobalRule::Structured(rule),
            Err(_) => GlobalRule::Expression(raw.to_string()),
        }
    }
}

/// Result of running the survey-level rules ahead of a forward transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalOutcome {
    /// All rules passed; sequential navigation proceeds.
    Pass,
    /// A structured rule matched; the transition ends at this visible index.
    Jump(usize),
    /// An expression rule failed; the transition is blocked.
    Blocked,
}

/// Evaluates global rules in declaration order. Structured rules whose
/// condition holds jump to their target (when it resolves to a visible
/// question) and end evaluation; expression rules that evaluate false
/// block the transition and end evaluation.
pub fn evaluate_global_rules(
    rules: &[String],
    answers: &AnswerMap,
    visible: &VisibleSet,
) -> GlobalOutcome {
    for raw in rules {
        match GlobalRule::parse(raw) {
            GlobalRule::Structured(rule) => {
                if !rule.condition_holds(answers) {
                    continue;
                }
                if let Some(index) = rule
                    .jump_target()
                    .and_then(|target| visible.index_of(target))
                {
                    return GlobalOutcome::Jump(index);
                }
                // Condition held but named no reachable target; the rule
                // is inert and the remaining rules still run.
            }
            GlobalRule::Expression(expr) => {
                let passed = RuleExpr::parse(&expr)
                    .is_some_and(|expr| expr.evaluate(answers, visible.items()));
                if !passed {
                    return GlobalOutcome::Blocked;
                }
            }
        }
    }
    GlobalOutcome::Pass
}
