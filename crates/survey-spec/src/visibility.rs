use crate::spec::question::QuestionSpec;
use crate::spec::survey::SurveySpec;

/// Title of the hidden question that receives auto-recorded audio and
/// auto-captured photos. The backend marks these roles by exact title
/// rather than a typed field, so the match is deliberately literal.
pub const AUTO_MEDIA_TITLE: &str = "录音和拍摄文件";

/// Title of the hidden question that receives the cached location fix.
pub const LOCATION_TITLE: &str = "位置信息";

/// Ordered subsequence of non-hidden questions (the pages actually
/// shown), plus the two reserved hidden questions routed to auto-upload
/// and location handling.
#[derive(Debug, Clone, Default)]
pub struct VisibleSet {
    items: Vec<QuestionSpec>,
    pub auto_media: Option<QuestionSpec>,
    pub location: Option<QuestionSpec>,
}

impl VisibleSet {
    pub fn resolve(spec: &SurveySpec) -> Self {
        let mut set = VisibleSet::default();
        for question in &spec.children {
            let hidden = question.is_hidden();
            if !hidden {
                set.items.push(question.clone());
            } else if question.title == AUTO_MEDIA_TITLE {
                set.auto_media = Some(question.clone());
            } else if question.title == LOCATION_TITLE {
                set.location = Some(question.clone());
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QuestionSpec> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[QuestionSpec] {
        &self.items
    }

    /// Position of a question in the visible ordering, used to resolve
    /// jump targets. Hidden questions have no position.
    pub fn index_of(&self, question_id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|question| question.id == question_id)
    }
}
