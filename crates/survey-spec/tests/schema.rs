use serde_json::json;
use survey_spec::{
    AnswerSet, QuestionType, SurveyDocument, VisibleSet, first_scalar, merge_entry, value_present,
};

fn sample_document() -> serde_json::Value {
    json!({
        "id": "srv-001",
        "name": "Store visit",
        "survey": {
            "title": "Store visit",
            "description": "Field check",
            "attribute": {"globalRule": ["#{q1.o1}!=''"]},
            "children": [
                {
                    "id": "q1",
                    "type": "Radio",
                    "title": "Open?",
                    "attribute": {"required": true, "jumpRule": "#{q1.o2}!='' && jump('q3')"},
                    "children": [
                        {"id": "o1", "title": "Yes"},
                        {"id": "o2", "title": "No"},
                        {
                            "id": "o3",
                            "title": "Other ____________",
                            "attribute": {"dataType": "horzBlank"},
                            "children": [{"id": "b1", "title": ""}]
                        }
                    ]
                },
                {
                    "id": "q2",
                    "type": "FillBlank",
                    "title": "Manager name",
                    "children": [{"id": "s1", "title": ""}]
                },
                {"id": "q3", "type": "Score", "title": "Shelf state"},
                {
                    "id": "media",
                    "type": "Upload",
                    "title": "录音和拍摄文件",
                    "attribute": {"display": "hidden"},
                    "children": [{"id": "files", "title": ""}]
                },
                {
                    "id": "loc",
                    "type": "FillBlank",
                    "title": "位置信息",
                    "attribute": {"display": "hidden"},
                    "children": [{"id": "pos", "title": ""}]
                }
            ]
        }
    })
}

#[test]
fn document_parses_types_and_attributes() {
    let document = SurveyDocument::parse(&sample_document());
    assert_eq!(document.id, "srv-001");
    assert_eq!(document.survey.children.len(), 5);

    let q1 = document.survey.question("q1").expect("q1 exists");
    assert_eq!(q1.kind, QuestionType::Radio);
    assert!(q1.is_required());
    assert!(!q1.is_hidden());
    assert_eq!(
        q1.attribute.jump_rule.as_deref(),
        Some("#{q1.o2}!='' && jump('q3')")
    );

    let q3 = document.survey.question("q3").expect("q3 exists");
    assert!(q3.kind.is_slider());
    assert!(!q3.is_required());
}

#[test]
fn inline_blank_helpers_read_the_option_shape() {
    let document = SurveyDocument::parse(&sample_document());
    let q1 = document.survey.question("q1").expect("q1 exists");
    let other = q1.option("o3").expect("o3 exists");
    assert!(other.has_inline_blank());
    assert_eq!(other.inline_blank_id(), Some("b1"));
    assert_eq!(other.inline_label(), "Other ");

    let plain = q1.option("o1").expect("o1 exists");
    assert!(!plain.has_inline_blank());
}

#[test]
fn sub_field_takes_the_last_named_child() {
    let document = SurveyDocument::parse(&json!({
        "id": "s",
        "name": "n",
        "survey": {"children": [{
            "id": "q1",
            "type": "Upload",
            "title": "Files",
            "children": [
                {"id": "hint", "title": "jpg only"},
                {"id": "files", "title": ""}
            ]
        }]}
    }));
    let q1 = document.survey.question("q1").expect("q1 exists");
    assert_eq!(q1.sub_field(), Some("files"));
}

#[test]
fn unknown_question_type_degrades_to_other() {
    let document = SurveyDocument::parse(&json!({
        "id": "s",
        "name": "n",
        "survey": {"children": [{"id": "q1", "type": "Hologram", "title": "??"}]}
    }));
    assert_eq!(document.survey.children[0].kind, QuestionType::Other);
}

#[test]
fn malformed_document_degrades_to_empty_survey() {
    let document = SurveyDocument::parse(&json!(["not", "an", "object"]));
    assert!(document.id.is_empty());
    assert!(document.survey.children.is_empty());
}

#[test]
fn visible_set_filters_hidden_and_keeps_reserved_questions() {
    let document = SurveyDocument::parse(&sample_document());
    let visible = VisibleSet::resolve(&document.survey);
    assert_eq!(visible.len(), 3);
    assert_eq!(visible.index_of("q3"), Some(2));
    assert_eq!(visible.index_of("media"), None);
    assert_eq!(
        visible.auto_media.as_ref().map(|q| q.id.as_str()),
        Some("media")
    );
    assert_eq!(visible.location.as_ref().map(|q| q.id.as_str()), Some("loc"));
}

#[test]
fn hidden_question_with_unreserved_title_is_dropped_entirely() {
    let document = SurveyDocument::parse(&json!({
        "id": "s",
        "name": "n",
        "survey": {"children": [
            {"id": "q1", "type": "FillBlank", "title": "Visible",
             "children": [{"id": "s1", "title": ""}]},
            {"id": "q2", "type": "FillBlank", "title": "Internal",
             "attribute": {"display": "hidden"}}
        ]}
    }));
    let visible = VisibleSet::resolve(&document.survey);
    assert_eq!(visible.len(), 1);
    assert!(visible.auto_media.is_none());
    assert!(visible.location.is_none());
}

#[test]
fn answer_helpers_follow_the_wire_shapes() {
    let entry = json!({"o1": "Yes", "o2": {"b1": "text"}});
    assert_eq!(first_scalar(&entry), Some("Yes"));
    assert_eq!(first_scalar(&json!({})), None);

    assert!(value_present(&json!("Yes")));
    assert!(!value_present(&json!("")));
    assert!(value_present(&json!({"b1": "x"})));
    assert!(!value_present(&json!({})));
    assert!(!value_present(&json!(null)));

    let mut answers = survey_spec::AnswerMap::new();
    merge_entry(&mut answers, "q1", "o1", json!("Yes"));
    merge_entry(&mut answers, "q1", "o2", json!(""));
    assert_eq!(
        serde_json::Value::Object(answers),
        json!({"q1": {"o1": "Yes", "o2": ""}})
    );
}

#[test]
fn answer_set_serializes_with_metadata() {
    let mut answers = survey_spec::AnswerMap::new();
    merge_entry(&mut answers, "q1", "o1", json!("Yes"));
    let answer_set = AnswerSet::new("srv-001", answers, 48_000);
    let pretty = answer_set.to_json_pretty().expect("serializes");
    assert!(pretty.contains("\"survey_id\""));
    assert!(pretty.contains("\"elapsed_ms\""));

    let decoded: AnswerSet = serde_json::from_str(&pretty).expect("round trips");
    assert_eq!(decoded, answer_set);
}
