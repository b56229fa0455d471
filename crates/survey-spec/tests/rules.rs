use serde_json::json;
use survey_spec::{
    AnswerMap, CmpOp, GlobalOutcome, QuestionSpec, RuleExpr, SurveyDocument, VisibleSet,
    evaluate_global_rules, jump_destination,
};

fn answers(value: serde_json::Value) -> AnswerMap {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("answers fixture must be an object"),
    }
}

fn questions(value: serde_json::Value) -> Vec<QuestionSpec> {
    serde_json::from_value(value).expect("questions fixture parses")
}

#[test]
fn parses_each_recognized_shape() {
    assert_eq!(RuleExpr::parse("true"), Some(RuleExpr::Literal(true)));
    assert_eq!(RuleExpr::parse("FALSE"), Some(RuleExpr::Literal(false)));
    assert!(matches!(
        RuleExpr::parse("#{q1}==#{q2}"),
        Some(RuleExpr::Compare { op: CmpOp::Eq, .. })
    ));
    assert!(matches!(
        RuleExpr::parse("#{q1.o1}!=#{q2.o2}"),
        Some(RuleExpr::Compare { op: CmpOp::Ne, .. })
    ));
    assert!(matches!(
        RuleExpr::parse("#{q1.o1}=='Yes'"),
        Some(RuleExpr::CompareText { op: CmpOp::Eq, .. })
    ));
    assert!(matches!(
        RuleExpr::parse("#{q1}==''"),
        Some(RuleExpr::IsEmpty(_))
    ));
    assert!(matches!(
        RuleExpr::parse("#{q1}!=''"),
        Some(RuleExpr::NotEmpty(_))
    ));
    assert!(matches!(
        RuleExpr::parse("jump('q5')"),
        Some(RuleExpr::Jump(target)) if target == "q5"
    ));
    assert!(matches!(
        RuleExpr::parse("includes(#{q1},'o2')"),
        Some(RuleExpr::Includes { .. })
    ));
    assert_eq!(RuleExpr::parse(""), None);
    assert_eq!(RuleExpr::parse("answers.q1 > 3"), None);
}

#[test]
fn text_comparison_reads_the_answered_sub_field() {
    let expr = RuleExpr::parse("#{q1.o1}=='Yes'").expect("parses");
    let yes = answers(json!({"q1": {"o1": "Yes"}}));
    let no = answers(json!({"q1": {"o2": "No"}}));
    let empty = AnswerMap::new();
    let qs = questions(json!([{
        "id": "q1", "type": "Radio", "title": "Open?",
        "children": [{"id": "o1", "title": "Yes"}, {"id": "o2", "title": "No"}]
    }]));

    assert!(expr.evaluate(&yes, &qs));
    // o1 missing from the entry: the reference is unresolved, not "Yes".
    assert!(!expr.evaluate(&no, &qs));
    assert!(!expr.evaluate(&empty, &qs));

    let ne = RuleExpr::parse("#{q1.o1}!='Yes'").expect("parses");
    // Unanswered questions fail the comparison under either operator.
    assert!(!ne.evaluate(&empty, &qs));
    assert!(!ne.evaluate(&yes, &qs));
}

#[test]
fn reference_comparison_falls_back_to_option_titles() {
    let qs = questions(json!([
        {"id": "q1", "type": "Radio", "title": "First",
         "children": [{"id": "o1", "title": "Same"}]},
        {"id": "q2", "type": "Radio", "title": "Second",
         "children": [{"id": "o9", "title": "Same"}]}
    ]));
    let expr = RuleExpr::parse("#{q1.o1}==#{q2.o9}").expect("parses");

    // Both answered with those options: labels match directly.
    let both = answers(json!({"q1": {"o1": "Same"}, "q2": {"o9": "Same"}}));
    assert!(expr.evaluate(&both, &qs));

    // q2 answered with a different option: o9 resolves to its title.
    let qs_mixed = questions(json!([
        {"id": "q1", "type": "Radio", "title": "First",
         "children": [{"id": "o1", "title": "Same"}]},
        {"id": "q2", "type": "Radio", "title": "Second",
         "children": [{"id": "o8", "title": "Other"}, {"id": "o9", "title": "Same"}]}
    ]));
    let mixed = answers(json!({"q1": {"o1": "Same"}, "q2": {"o8": "Other"}}));
    assert!(expr.evaluate(&mixed, &qs_mixed));

    // q2 never answered: no fallback, equality fails.
    let half = answers(json!({"q1": {"o1": "Same"}}));
    assert!(!expr.evaluate(&half, &qs));
}

#[test]
fn presence_checks_see_through_inline_blanks() {
    let qs: Vec<QuestionSpec> = Vec::new();
    let not_empty = RuleExpr::parse("#{q1.o3}!=''").expect("parses");
    let nested = answers(json!({"q1": {"o3": {"b1": "typed"}}}));
    let cleared = answers(json!({"q1": {"o3": {}}}));
    assert!(not_empty.evaluate(&nested, &qs));
    assert!(!not_empty.evaluate(&cleared, &qs));

    let is_empty = RuleExpr::parse("#{q9}==''").expect("parses");
    assert!(is_empty.evaluate(&AnswerMap::new(), &qs));
    assert!(!is_empty.evaluate(&answers(json!({"q9": {"o1": "x"}})), &qs));
}

#[test]
fn includes_matches_exact_values_only() {
    let qs: Vec<QuestionSpec> = Vec::new();
    let expr = RuleExpr::parse("includes(#{q1}, 'North')").expect("parses");
    assert!(expr.evaluate(&answers(json!({"q1": {"o1": "North", "o2": "East"}})), &qs));
    assert!(!expr.evaluate(&answers(json!({"q1": {"o1": "North-West"}})), &qs));
    assert!(!expr.evaluate(&AnswerMap::new(), &qs));
}

#[test]
fn jump_destination_prefers_the_call_form() {
    assert_eq!(
        jump_destination("#{q1.o2}!='' && jump('q5')").as_deref(),
        Some("q5")
    );
    assert_eq!(jump_destination("#{q1.o1}=='skip to q7'").as_deref(), None);
    assert_eq!(jump_destination("goto 'q7'").as_deref(), Some("q7"));
    assert_eq!(jump_destination("#{q1}==#{q2}"), None);
}

fn visible_fixture() -> VisibleSet {
    let document = SurveyDocument::parse(&json!({
        "id": "s",
        "name": "n",
        "survey": {"children": [
            {"id": "q1", "type": "Radio", "title": "a",
             "children": [{"id": "o1", "title": "A"}, {"id": "o2", "title": "B"}]},
            {"id": "q2", "type": "FillBlank", "title": "b",
             "children": [{"id": "s1", "title": ""}]},
            {"id": "q3", "type": "Checkbox", "title": "c",
             "children": [{"id": "o1", "title": "C1"}, {"id": "o2", "title": "C2"}]},
            {"id": "q4", "type": "Nps", "title": "d"}
        ]}
    }));
    VisibleSet::resolve(&document.survey)
}

fn structured(condition_logic: &str, items: serde_json::Value, target: &str) -> String {
    json!({
        "conditionItem": items,
        "conditionLogic": condition_logic,
        "result": [{"type": "jump", "qId": target}]
    })
    .to_string()
}

#[test]
fn structured_rule_jumps_when_all_and_clauses_hold() {
    let visible = visible_fixture();
    let rule = structured(
        "AND",
        json!([
            {"qId": "q1", "condition": "CHECKED", "oId": ["o2"]},
            {"qId": "q3", "condition": "CHECKED", "oId": ["o1", "o2"]}
        ]),
        "q4",
    );
    let held = answers(json!({"q1": {"o2": "B"}, "q3": {"o2": "C2"}}));
    assert_eq!(
        evaluate_global_rules(&[rule.clone()], &held, &visible),
        GlobalOutcome::Jump(3)
    );

    let partial = answers(json!({"q1": {"o2": "B"}}));
    assert_eq!(
        evaluate_global_rules(&[rule], &partial, &visible),
        GlobalOutcome::Pass
    );
}

#[test]
fn structured_rule_or_logic_needs_any_clause() {
    let visible = visible_fixture();
    let rule = structured(
        "OR",
        json!([
            {"qId": "q1", "condition": "CHECKED", "oId": ["o1"]},
            {"qId": "q3", "condition": "CHECKED", "oId": ["o1"]}
        ]),
        "q3",
    );
    let one_held = answers(json!({"q3": {"o1": "C1"}}));
    assert_eq!(
        evaluate_global_rules(&[rule.clone()], &one_held, &visible),
        GlobalOutcome::Jump(2)
    );
    assert_eq!(
        evaluate_global_rules(&[rule], &AnswerMap::new(), &visible),
        GlobalOutcome::Pass
    );
}

#[test]
fn structured_rule_with_unknown_target_is_inert() {
    let visible = visible_fixture();
    let rule = structured(
        "AND",
        json!([{"qId": "q1", "condition": "CHECKED", "oId": ["o1"]}]),
        "q99",
    );
    let held = answers(json!({"q1": {"o1": "A"}}));
    assert_eq!(
        evaluate_global_rules(&[rule], &held, &visible),
        GlobalOutcome::Pass
    );
}

#[test]
fn failing_expression_rule_blocks_and_stops_evaluation() {
    let visible = visible_fixture();
    let gate = "#{q1.o1}!=''".to_string();
    let later_jump = structured(
        "AND",
        json!([{"qId": "q1", "condition": "CHECKED", "oId": ["o2"]}]),
        "q4",
    );
    let unanswered = AnswerMap::new();
    assert_eq!(
        evaluate_global_rules(&[gate.clone(), later_jump.clone()], &unanswered, &visible),
        GlobalOutcome::Blocked
    );

    let answered = answers(json!({"q1": {"o1": "A"}}));
    assert_eq!(
        evaluate_global_rules(&[gate, later_jump], &answered, &visible),
        GlobalOutcome::Pass
    );
}

#[test]
fn unparseable_expression_rule_blocks() {
    let visible = visible_fixture();
    assert_eq!(
        evaluate_global_rules(&["answers[q1] > 3".to_string()], &AnswerMap::new(), &visible),
        GlobalOutcome::Blocked
    );
}
