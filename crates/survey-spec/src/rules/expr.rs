use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::answers::{AnswerMap, first_scalar, value_present};
use crate::spec::question::QuestionSpec;

/// Reference to a question's answer, optionally narrowed to one
/// option/sub-field, written `#{questionId}` or `#{questionId.subId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRef {
    pub question: String,
    pub sub: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
}

/// Recognized rule expression shapes.
///
/// This is a fixed-shape matcher, not an expression grammar: each rule
/// string is probed against the shapes below in order and the first hit
/// wins. A `jump()` call embedded inside a larger boolean expression is
/// therefore matched on its own, not composed with the surrounding
/// logic; a known limitation carried over from the rule format. Anything
/// that matches no shape evaluates to false.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleExpr {
    Literal(bool),
    /// `jump('qId')`: condition satisfied, navigate to the target.
    Jump(String),
    /// `#{q}==#{q2}` / `#{q.sub}!=#{q2.sub2}`.
    Compare {
        left: AnswerRef,
        op: CmpOp,
        right: AnswerRef,
    },
    /// `#{q}=='value'` with a non-empty literal.
    CompareText {
        target: AnswerRef,
        op: CmpOp,
        text: String,
    },
    /// `#{q}==''`: question (or sub-field) has no answer.
    IsEmpty(AnswerRef),
    /// `#{q}!=''`: question (or sub-field) has an answer.
    NotEmpty(AnswerRef),
    /// `includes(#{q}, 'value')`: membership over the answer's values.
    Includes { target: AnswerRef, needle: String },
}

static TWO_REFS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#\{(\w+)(?:\.(\w+))?\}\s*(==|!=)\s*#\{(\w+)(?:\.(\w+))?\}").expect("two-ref pattern")
});
static REF_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"#\{(\w+)(?:\.(\w+))?\}\s*(==|!=)\s*['"]([^'"]*)['"]"#).expect("ref-text pattern")
});
static JUMP_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"jump\s*\(\s*['"]?(\w+)['"]?\s*\)"#).expect("jump pattern"));
static INCLUDES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"includes\s*\(\s*#\{(\w+)(?:\.(\w+))?\}\s*,\s*['"]([^'"]*)['"]\s*\)"#)
        .expect("includes pattern")
});
static QUOTED_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"'(\w+)'").expect("quoted-id pattern"));

fn answer_ref(question: &str, sub: Option<&str>) -> AnswerRef {
    AnswerRef {
        question: question.to_string(),
        sub: sub.filter(|sub| !sub.is_empty()).map(str::to_string),
    }
}

fn cmp_op(raw: &str) -> CmpOp {
    if raw == "==" { CmpOp::Eq } else { CmpOp::Ne }
}

impl RuleExpr {
    /// Matches a rule string against the recognized shapes. Returns `None`
    /// for empty or unrecognized input; callers treat that as false.
    pub fn parse(raw: &str) -> Option<RuleExpr> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Some(RuleExpr::Literal(true));
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Some(RuleExpr::Literal(false));
        }

        if let Some(caps) = TWO_REFS.captures(trimmed) {
            return Some(RuleExpr::Compare {
                left: answer_ref(&caps[1], caps.get(2).map(|m| m.as_str())),
                op: cmp_op(&caps[3]),
                right: answer_ref(&caps[4], caps.get(5).map(|m| m.as_str())),
            });
        }

        if let Some(caps) = REF_TEXT.captures(trimmed) {
            let target = answer_ref(&caps[1], caps.get(2).map(|m| m.as_str()));
            let op = cmp_op(&caps[3]);
            let text = caps[4].to_string();
            // The empty literal is a presence check, not a comparison.
            if text.is_empty() {
                return Some(match op {
                    CmpOp::Eq => RuleExpr::IsEmpty(target),
                    CmpOp::Ne => RuleExpr::NotEmpty(target),
                });
            }
            return Some(RuleExpr::CompareText { target, op, text });
        }

        if let Some(caps) = JUMP_CALL.captures(trimmed) {
            return Some(RuleExpr::Jump(caps[1].to_string()));
        }

        if let Some(caps) = INCLUDES.captures(trimmed) {
            return Some(RuleExpr::Includes {
                target: answer_ref(&caps[1], caps.get(2).map(|m| m.as_str())),
                needle: caps[3].to_string(),
            });
        }

        None
    }

    /// Evaluates against the full current answer set. `questions` supplies
    /// option titles for references that name an option id rather than an
    /// answered sub-field.
    pub fn evaluate(&self, answers: &AnswerMap, questions: &[QuestionSpec]) -> bool {
        match self {
            RuleExpr::Literal(value) => *value,
            RuleExpr::Jump(_) => true,
            RuleExpr::Compare { left, op, right } => {
                let left_value = resolve_ref(left, answers, questions);
                let right_value = resolve_ref(right, answers, questions);
                match op {
                    CmpOp::Eq => match (left_value, right_value) {
                        (Some(left), Some(right)) => left == right,
                        _ => false,
                    },
                    // Unresolvable sides compare as not-equal.
                    CmpOp::Ne => match (left_value, right_value) {
                        (Some(left), Some(right)) => left != right,
                        _ => true,
                    },
                }
            }
            RuleExpr::CompareText { target, op, text } => {
                let Some(actual) = resolve_scalar(target, answers) else {
                    // Unanswered questions fail the comparison either way.
                    return false;
                };
                match op {
                    CmpOp::Eq => actual == *text,
                    CmpOp::Ne => actual != *text,
                }
            }
            RuleExpr::IsEmpty(target) => !ref_present(target, answers),
            RuleExpr::NotEmpty(target) => ref_present(target, answers),
            RuleExpr::Includes { target, needle } => {
                let Some(entry) = answers.get(&target.question) else {
                    return false;
                };
                let scope = match &target.sub {
                    Some(sub) => match entry.get(sub) {
                        Some(value) => value,
                        None => return false,
                    },
                    None => entry,
                };
                scope
                    .as_object()
                    .is_some_and(|map| map.values().any(|value| value.as_str() == Some(needle)))
            }
        }
    }

    /// Target carried by a `jump()` shape.
    pub fn jump_target(&self) -> Option<&str> {
        match self {
            RuleExpr::Jump(target) => Some(target),
            _ => None,
        }
    }
}

/// Destination named by a jump rule string: a `jump('id')` call wins,
/// otherwise the first bare quoted id in the rule text.
pub fn jump_destination(raw: &str) -> Option<String> {
    if let Some(caps) = JUMP_CALL.captures(raw) {
        return Some(caps[1].to_string());
    }
    QUOTED_ID
        .captures(raw)
        .map(|caps| caps[1].to_string())
}

/// First scalar under a reference: the sub-field's value when named (one
/// level of nesting unwrapped for inline blanks), otherwise the first
/// string in the question's answer object.
fn resolve_scalar(target: &AnswerRef, answers: &AnswerMap) -> Option<String> {
    let entry = answers.get(&target.question)?;
    match &target.sub {
        Some(sub) => {
            let value = entry.get(sub)?;
            match value {
                Value::String(text) => Some(text.clone()),
                Value::Object(_) => first_scalar(value).map(str::to_string),
                _ => None,
            }
        }
        None => first_scalar(entry).map(str::to_string),
    }
}

/// Like [`resolve_scalar`], but a sub id that is not an answer entry falls
/// back to that option's own title in the referenced question.
fn resolve_ref(
    target: &AnswerRef,
    answers: &AnswerMap,
    questions: &[QuestionSpec],
) -> Option<String> {
    if let Some(value) = resolve_scalar(target, answers) {
        return Some(value);
    }
    let sub = target.sub.as_deref()?;
    // Only fall back for answered questions, mirroring the rule format's
    // "compare against the option label" usage.
    answers.get(&target.question)?;
    questions
        .iter()
        .find(|question| question.id == target.question)
        .and_then(|question| question.option(sub))
        .map(|option| option.title.clone())
}

fn ref_present(target: &AnswerRef, answers: &AnswerMap) -> bool {
    let Some(entry) = answers.get(&target.question) else {
        return false;
    };
    match &target.sub {
        Some(sub) => entry.get(sub).is_some_and(value_present),
        None => entry.as_object().is_some_and(|map| !map.is_empty()),
    }
}
