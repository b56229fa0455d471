use survey_spec::{QuestionSpec, QuestionType};

/// Inline text input attached to a choice row, active only while that
/// row is selected.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineBlank {
    /// Id of the text input, from the option's first child.
    pub sub_id: String,
    pub text: String,
    pub enabled: bool,
}

/// One selectable row of a radio or checkbox question.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceRow {
    pub option_id: String,
    pub label: String,
    pub checked: bool,
    pub inline: Option<InlineBlank>,
}

/// One entry in a drop-down. The placeholder row is not materialized;
/// `Select::selected == 0` stands for it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub option_id: String,
    pub label: String,
}

/// One labelled blank of a multiple-blank question.
#[derive(Debug, Clone, PartialEq)]
pub struct BlankField {
    pub sub_id: String,
    pub label: String,
    pub text: String,
}

pub const SLIDER_MIN: i64 = 0;
pub const SLIDER_MAX: i64 = 10;

/// Typed body of a rendered page, one variant per question family.
#[derive(Debug, Clone, PartialEq)]
pub enum PageBody {
    /// Single free-text input (fill-blank, textarea, and unknown types).
    TextInput {
        /// Sub-field id the text is stored under; empty when the schema
        /// names none, in which case the answer is never collected.
        sub_id: String,
        text: String,
    },
    /// Radio (`multiple == false`) or checkbox rows.
    Choices { multiple: bool, rows: Vec<ChoiceRow> },
    /// Drop-down; index 0 is the unselected placeholder, index `n`
    /// selects `items[n - 1]`.
    Select { items: Vec<SelectItem>, selected: usize },
    /// Multiple labelled blanks, all required to count as answered.
    Blanks { fields: Vec<BlankField> },
    /// Score / NPS slider.
    Slider { value: i64 },
    /// File picker; `files` lists display names of chosen files. The
    /// actual transfer state lives with the upload tracker.
    Upload { files: Vec<String> },
    /// Rendered read-only in this engine; produces no answer entry.
    Passive,
}

/// A single question rendered as an interactive page. Rendering is pure:
/// building a page twice from the same question yields the same page, and
/// saved answers are applied afterwards by the answer store.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub question_id: String,
    pub title: String,
    pub description: String,
    pub required: bool,
    pub kind: QuestionType,
    pub body: PageBody,
}

impl Page {
    pub fn render(question: &QuestionSpec) -> Page {
        Page {
            question_id: question.id.clone(),
            title: question.title.clone(),
            description: question.description.clone(),
            required: question.is_required(),
            kind: question.kind,
            body: Self::render_body(question),
        }
    }

    fn render_body(question: &QuestionSpec) -> PageBody {
        match question.kind {
            QuestionType::FillBlank | QuestionType::Textarea | QuestionType::Other => {
                PageBody::TextInput {
                    sub_id: question.sub_field().unwrap_or_default().to_string(),
                    text: String::new(),
                }
            }
            QuestionType::Radio | QuestionType::Checkbox => PageBody::Choices {
                multiple: question.kind == QuestionType::Checkbox,
                rows: question
                    .children
                    .iter()
                    .map(|option| {
                        let inline = option.has_inline_blank().then(|| InlineBlank {
                            sub_id: option.inline_blank_id().unwrap_or_default().to_string(),
                            text: String::new(),
                            enabled: false,
                        });
                        ChoiceRow {
                            option_id: option.id.clone(),
                            label: if inline.is_some() {
                                option.inline_label()
                            } else {
                                option.title.clone()
                            },
                            checked: false,
                            inline,
                        }
                    })
                    .collect(),
            },
            QuestionType::Select => PageBody::Select {
                items: question
                    .children
                    .iter()
                    .map(|option| SelectItem {
                        option_id: option.id.clone(),
                        label: option.title.clone(),
                    })
                    .collect(),
                selected: 0,
            },
            QuestionType::MultipleBlank => PageBody::Blanks {
                fields: question
                    .children
                    .iter()
                    .map(|option| BlankField {
                        sub_id: option.id.clone(),
                        label: option.title.clone(),
                        text: String::new(),
                    })
                    .collect(),
            },
            QuestionType::Score | QuestionType::Nps => PageBody::Slider { value: SLIDER_MIN },
            QuestionType::Upload => PageBody::Upload { files: Vec::new() },
            QuestionType::Cascader | QuestionType::Signature | QuestionType::Barcode => {
                PageBody::Passive
            }
        }
    }

    /// Replaces the text of a single-input page.
    pub fn set_text(&mut self, value: &str) {
        if let PageBody::TextInput { text, .. } = &mut self.body {
            *text = value.to_string();
        }
    }

    /// Checks or unchecks a choice row. Radio pages keep exactly one row
    /// checked; unchecking a row clears and disables its inline blank.
    pub fn toggle_option(&mut self, option_id: &str, on: bool) {
        let PageBody::Choices { multiple, rows } = &mut self.body else {
            return;
        };
        let exclusive = !*multiple;
        for row in rows.iter_mut() {
            let target = row.option_id == option_id;
            let checked = if target {
                on
            } else if exclusive && on {
                false
            } else {
                row.checked
            };
            if checked != row.checked {
                row.checked = checked;
                if let Some(inline) = &mut row.inline {
                    inline.enabled = checked;
                    if !checked {
                        inline.text.clear();
                    }
                }
            }
        }
    }

    /// Types into the inline blank of a choice row. Ignored while the row
    /// is unchecked, mirroring the disabled input.
    pub fn set_inline_text(&mut self, option_id: &str, value: &str) {
        if let PageBody::Choices { rows, .. } = &mut self.body
            && let Some(row) = rows.iter_mut().find(|row| row.option_id == option_id)
            && let Some(inline) = &mut row.inline
            && inline.enabled
        {
            inline.text = value.to_string();
        }
    }

    /// Sets the drop-down index; 0 returns to the placeholder.
    pub fn select_index(&mut self, index: usize) {
        if let PageBody::Select { items, selected } = &mut self.body
            && index <= items.len()
        {
            *selected = index;
        }
    }

    pub fn set_blank(&mut self, sub_id: &str, value: &str) {
        if let PageBody::Blanks { fields } = &mut self.body
            && let Some(field) = fields.iter_mut().find(|field| field.sub_id == sub_id)
        {
            field.text = value.to_string();
        }
    }

    pub fn set_slider(&mut self, value: i64) {
        if let PageBody::Slider { value: current } = &mut self.body {
            *current = value.clamp(SLIDER_MIN, SLIDER_MAX);
        }
    }

    pub(crate) fn add_upload_file(&mut self, name: &str) {
        if let PageBody::Upload { files } = &mut self.body {
            files.push(name.to_string());
        }
    }

    /// Rough content height in text rows, used by the deferred layout
    /// pass to pick a scroll policy once the viewport size is known.
    pub fn estimated_rows(&self) -> usize {
        let header = 2 + usize::from(!self.description.is_empty());
        let body = match &self.body {
            PageBody::TextInput { .. } => 3,
            PageBody::Choices { rows, .. } => rows.len(),
            PageBody::Select { items, .. } => items.len().min(8) + 1,
            PageBody::Blanks { fields } => fields.len() * 2,
            PageBody::Slider { .. } => 2,
            PageBody::Upload { files } => files.len() + 2,
            PageBody::Passive => 1,
        };
        header + body
    }
}

/// Scroll affordance chosen after the page's content height is measured
/// against the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPolicy {
    /// Content fits; no scrollbar is shown.
    AlwaysOff,
    /// Content overflows; scrolling is available.
    AsNeeded,
}
