use std::collections::BTreeMap;

use serde_json::{Map, Value};
use survey_spec::{AnswerMap, first_scalar};

use crate::page::{Page, PageBody};

/// Per-page answers captured on every navigation, keyed by visible page
/// index. Survives until submission completes, so revisiting a page
/// restores exactly what was entered.
#[derive(Debug, Default)]
pub struct AnswerCache {
    entries: BTreeMap<usize, AnswerMap>,
}

impl AnswerCache {
    pub fn save(&mut self, index: usize, answer: AnswerMap) {
        self.entries.insert(index, answer);
    }

    pub fn get(&self, index: usize) -> Option<&AnswerMap> {
        self.entries.get(&index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Merges all cached page answers, in page order, into one submission
    /// map. Page indices are unique per question so entries never collide.
    pub fn collect(&self) -> AnswerMap {
        let mut merged = AnswerMap::new();
        for answer in self.entries.values() {
            for (question_id, entry) in answer {
                merged.insert(question_id.clone(), entry.clone());
            }
        }
        merged
    }
}

/// Reads a page's controls into the wire answer format. Pages with
/// nothing entered produce an empty map and no entry for the question.
pub fn capture(page: &Page) -> AnswerMap {
    let mut entry = Map::new();
    match &page.body {
        PageBody::TextInput { sub_id, text } => {
            if !sub_id.is_empty() && !text.is_empty() {
                entry.insert(sub_id.clone(), Value::String(text.clone()));
            }
        }
        PageBody::Choices { rows, .. } => {
            for row in rows.iter().filter(|row| row.checked) {
                let value = match &row.inline {
                    Some(inline) if !inline.text.is_empty() => {
                        let mut nested = Map::new();
                        nested.insert(inline.sub_id.clone(), Value::String(inline.text.clone()));
                        Value::Object(nested)
                    }
                    Some(_) => Value::String(String::new()),
                    None => Value::String(row.label.clone()),
                };
                entry.insert(row.option_id.clone(), value);
            }
        }
        PageBody::Select { items, selected } => {
            if let Some(item) = selected.checked_sub(1).and_then(|i| items.get(i)) {
                entry.insert(item.option_id.clone(), Value::String(item.option_id.clone()));
            }
        }
        PageBody::Blanks { fields } => {
            for field in fields.iter().filter(|field| !field.text.is_empty()) {
                entry.insert(field.sub_id.clone(), Value::String(field.text.clone()));
            }
        }
        PageBody::Slider { value } => {
            entry.insert(page.question_id.clone(), Value::String(value.to_string()));
        }
        PageBody::Upload { .. } | PageBody::Passive => {}
    }

    let mut answer = AnswerMap::new();
    if !entry.is_empty() {
        answer.insert(page.question_id.clone(), Value::Object(entry));
    }
    answer
}

/// Applies a previously captured answer back onto a freshly rendered
/// page. Unknown ids in the saved answer are ignored.
pub fn restore(page: &mut Page, saved: &AnswerMap) {
    let Some(entry) = saved.get(&page.question_id).and_then(Value::as_object) else {
        return;
    };
    match &mut page.body {
        PageBody::TextInput { text, .. } => {
            if let Some(value) = entry.values().find_map(Value::as_str) {
                *text = value.to_string();
            }
        }
        PageBody::Choices { rows, .. } => {
            for row in rows.iter_mut() {
                let Some(value) = entry.get(&row.option_id) else {
                    continue;
                };
                row.checked = true;
                if let Some(inline) = &mut row.inline {
                    inline.enabled = true;
                    if let Some(text) = first_scalar(value) {
                        inline.text = text.to_string();
                    }
                }
            }
        }
        PageBody::Select { items, selected } => {
            if let Some(position) = items
                .iter()
                .position(|item| entry.contains_key(&item.option_id))
            {
                *selected = position + 1;
            }
        }
        PageBody::Blanks { fields } => {
            for field in fields.iter_mut() {
                if let Some(text) = entry.get(&field.sub_id).and_then(Value::as_str) {
                    field.text = text.to_string();
                }
            }
        }
        PageBody::Slider { value } => {
            if let Some(saved_value) = entry
                .get(&page.question_id)
                .and_then(Value::as_str)
                .and_then(|text| text.parse::<i64>().ok())
            {
                *value = saved_value;
            }
        }
        PageBody::Upload { .. } | PageBody::Passive => {}
    }
}

/// Whether the page satisfies a `required` flag. Sliders always count:
/// their resting position is a valid score. Passive and upload pages
/// never block.
pub fn is_answered(page: &Page) -> bool {
    match &page.body {
        PageBody::TextInput { text, .. } => !text.trim().is_empty(),
        PageBody::Choices { rows, .. } => rows.iter().any(|row| row.checked),
        PageBody::Select { selected, .. } => *selected > 0,
        PageBody::Blanks { fields } => fields.iter().all(|field| !field.text.trim().is_empty()),
        PageBody::Slider { .. } | PageBody::Upload { .. } | PageBody::Passive => true,
    }
}
