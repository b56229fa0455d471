use std::path::PathBuf;
use std::time::Instant;

use serde_json::Value;
use survey_spec::{
    AnswerMap, AnswerSet, GlobalOutcome, RuleExpr, SurveyDocument, VisibleSet,
    evaluate_global_rules, jump_destination, merge_entry,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::media::{AudioRecorder, PhotoCapture};
use crate::page::{Page, ScrollPolicy};
use crate::services::{LocationProvider, SessionSettings};
use crate::store::{self, AnswerCache};
use crate::uploads::{UploadJobId, UploadRequest, UploadTracker, UploadedFile};

/// Host integrations a session runs against. Recording and capture are
/// optional; a host without them simply never produces auto media.
pub struct SessionServices {
    pub settings: SessionSettings,
    pub location: Box<dyn LocationProvider>,
    pub recorder: Option<Box<dyn AudioRecorder>>,
    pub capture: Option<Box<dyn PhotoCapture>>,
}

/// Why a forward transition or submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlockReason {
    #[error("this question is required")]
    RequiredUnanswered,
    #[error("survey rules do not allow continuing")]
    RuleFailed,
}

/// Result of asking the session to move forward one step.
#[derive(Debug, PartialEq)]
pub enum StepOutcome {
    /// Now showing the page at this visible index.
    Moved(usize),
    Blocked(BlockReason),
    /// A finish rule fired; the session submitted from this page.
    Finished(SubmitOutcome),
}

#[derive(Debug, PartialEq)]
pub enum SubmitOutcome {
    Submitted(AnswerSet),
    /// Uploads are still in flight; the submission fires from
    /// [`SurveySession::on_upload_result`] once they settle.
    Deferred,
    Blocked(BlockReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based position of the current page.
    pub position: usize,
    pub total: usize,
    pub percent: u32,
}

/// Which navigation affordances the current page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavButtons {
    pub prev_enabled: bool,
    pub next_visible: bool,
    pub submit_visible: bool,
}

/// One answering session over a survey document: a cursor over the
/// visible pages, the answer cache, and the upload counter. Single
/// threaded; upload and media completions are delivered by method call.
pub struct SurveySession {
    document: SurveyDocument,
    visible: VisibleSet,
    index: usize,
    page: Option<Page>,
    cache: AnswerCache,
    uploads: UploadTracker,
    /// Upload requests (manual attachments and auto media) awaiting
    /// pickup by the host.
    outbox: Vec<UploadRequest>,
    services: SessionServices,
    started_at: Instant,
    recording: bool,
    capturing: bool,
    layout_pending: bool,
}

impl SurveySession {
    /// Opens a session: resolves the visible page set, renders the first
    /// page, starts location updates, and starts auto media according to
    /// the settings. Media start failures disable that feature and are
    /// logged, nothing more.
    pub fn start(document: SurveyDocument, mut services: SessionServices) -> Self {
        let visible = VisibleSet::resolve(&document.survey);
        info!(
            survey = document.id.as_str(),
            pages = visible.len(),
            "session started"
        );
        services
            .location
            .start_updates(std::time::Duration::from_secs(30));

        let mut recording = false;
        if services.settings.auto_record
            && let Some(recorder) = &mut services.recorder
        {
            match recorder.start(&document.name) {
                Ok(()) => recording = true,
                Err(error) => warn!(%error, "audio recorder failed to start"),
            }
        }
        let mut capturing = false;
        if services.settings.auto_capture
            && let Some(capture) = &mut services.capture
        {
            match capture.start(services.settings.capture_interval, &document.name) {
                Ok(()) => capturing = true,
                Err(error) => warn!(%error, "photo capture failed to start"),
            }
        }

        let page = visible.get(0).map(Page::render);
        let layout_pending = page.is_some();
        Self {
            document,
            visible,
            index: 0,
            page,
            cache: AnswerCache::default(),
            uploads: UploadTracker::default(),
            outbox: Vec::new(),
            services,
            started_at: Instant::now(),
            recording,
            capturing,
            layout_pending,
        }
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// Mutable access to the current page's controls. Edits are captured
    /// into the cache on the next navigation or submission.
    pub fn page_mut(&mut self) -> Option<&mut Page> {
        self.page.as_mut()
    }

    pub fn progress(&self) -> Progress {
        let total = self.visible.len();
        let position = if total == 0 { 0 } else { self.index + 1 };
        let percent = if total == 0 {
            0
        } else {
            (position * 100 / total) as u32
        };
        Progress {
            position,
            total,
            percent,
        }
    }

    pub fn buttons(&self) -> NavButtons {
        let last = self.visible.len() <= 1 || self.index + 1 == self.visible.len();
        NavButtons {
            prev_enabled: self.index > 0,
            next_visible: !last,
            submit_visible: last,
        }
    }

    /// Deferred layout pass: once the host knows its viewport height, the
    /// page's content height decides the scroll affordance.
    pub fn measure(&mut self, viewport_rows: usize) -> ScrollPolicy {
        self.layout_pending = false;
        match &self.page {
            Some(page) if page.estimated_rows() > viewport_rows => ScrollPolicy::AsNeeded,
            _ => ScrollPolicy::AlwaysOff,
        }
    }

    /// Whether a render happened since the last `measure` call.
    pub fn layout_pending(&self) -> bool {
        self.layout_pending
    }

    /// Moves forward: captures the page, enforces `required`, runs the
    /// survey-level rules, then this question's finish and jump rules.
    /// A rule jump is terminal for the transition; later rules never
    /// override it.
    pub fn next(&mut self) -> StepOutcome {
        let Some(page) = &self.page else {
            return StepOutcome::Moved(self.index);
        };
        self.cache.save(self.index, store::capture(page));
        if let Some(reason) = self.required_block() {
            return StepOutcome::Blocked(reason);
        }

        let answers = self.cache.collect();
        match evaluate_global_rules(
            &self.document.survey.attribute.global_rule,
            &answers,
            &self.visible,
        ) {
            GlobalOutcome::Blocked => {
                debug!(index = self.index, "blocked by survey rule");
                return StepOutcome::Blocked(BlockReason::RuleFailed);
            }
            GlobalOutcome::Jump(target) => {
                debug!(from = self.index, to = target, "survey rule jump");
                self.show(target);
                return StepOutcome::Moved(target);
            }
            GlobalOutcome::Pass => {}
        }

        if self.finish_rule_fires(&answers) {
            debug!(index = self.index, "finish rule fired");
            return StepOutcome::Finished(self.submit());
        }

        let target = self.jump_rule_target(&answers).unwrap_or(self.index + 1);
        if target >= self.visible.len() {
            return StepOutcome::Moved(self.index);
        }
        self.show(target);
        StepOutcome::Moved(target)
    }

    /// Moves back one page, restoring its cached answer. At the first
    /// page this is a no-op.
    pub fn previous(&mut self) -> usize {
        if let Some(page) = &self.page {
            self.cache.save(self.index, store::capture(page));
        }
        if self.index > 0 {
            let target = self.index - 1;
            self.show(target);
        }
        self.index
    }

    /// Submits the session. Stops auto media first so their files join
    /// the upload queue; with uploads still pending the submission is
    /// deferred until the queue drains.
    pub fn submit(&mut self) -> SubmitOutcome {
        if let Some(page) = &self.page {
            self.cache.save(self.index, store::capture(page));
        }
        if let Some(reason) = self.required_block() {
            return SubmitOutcome::Blocked(reason);
        }

        self.stop_auto_media();
        if self.uploads.is_uploading() {
            info!(
                pending = self.uploads.pending_count(),
                "submission deferred until uploads settle"
            );
            self.uploads.defer_submit();
            return SubmitOutcome::Deferred;
        }
        SubmitOutcome::Submitted(self.assemble())
    }

    /// Attaches a file to an upload question. The generated upload
    /// request joins the outbox alongside auto media, so the host picks
    /// it up through [`SurveySession::take_upload_requests`]. Returns
    /// `None` when the current page is not an upload page.
    pub fn attach_file(&mut self, path: PathBuf) -> Option<UploadJobId> {
        let page = self.page.as_mut()?;
        if !matches!(page.body, crate::page::PageBody::Upload { .. }) {
            return None;
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        page.add_upload_file(&name);
        let question_id = page.question_id.clone();
        let sub_field = self
            .visible
            .get(self.index)
            .and_then(|question| question.sub_field())
            .map(str::to_string);
        let request = self.uploads.begin(
            &self.document.id,
            &question_id,
            sub_field.as_deref(),
            path,
        );
        let job = request.job;
        self.outbox.push(request);
        Some(job)
    }

    /// Delivers an upload result. When this settles the last pending
    /// upload of a deferred submission, the finished submission is
    /// returned.
    pub fn on_upload_result(
        &mut self,
        job: UploadJobId,
        result: Result<UploadedFile, String>,
    ) -> Option<AnswerSet> {
        self.uploads
            .resolve(job, result)
            .then(|| self.assemble())
    }

    pub fn pending_uploads(&self) -> usize {
        self.uploads.pending_count()
    }

    fn required_block(&self) -> Option<BlockReason> {
        let page = self.page.as_ref()?;
        let required = self
            .visible
            .get(self.index)
            .is_some_and(|question| question.is_required());
        (required && !store::is_answered(page)).then_some(BlockReason::RequiredUnanswered)
    }

    /// Renders the page at `target` and restores its cached answer, if
    /// any. Rendering from the schema and replaying the saved answer
    /// keeps revisits identical to the first visit.
    fn show(&mut self, target: usize) {
        let Some(question) = self.visible.get(target) else {
            return;
        };
        let mut page = Page::render(question);
        if let Some(saved) = self.cache.get(target) {
            store::restore(&mut page, saved);
        }
        self.page = Some(page);
        self.index = target;
        self.layout_pending = true;
    }

    fn finish_rule_fires(&self, answers: &AnswerMap) -> bool {
        self.question_rule(answers, |question| {
            question.attribute.finish_rule.as_deref()
        })
        .is_some()
    }

    fn jump_rule_target(&self, answers: &AnswerMap) -> Option<usize> {
        let raw = self
            .question_rule(answers, |question| question.attribute.jump_rule.as_deref())?;
        let destination = jump_destination(raw)?;
        let target = self.visible.index_of(&destination);
        if target.is_none() {
            warn!(rule = raw, "jump rule names no visible question");
        }
        target
    }

    /// Evaluates a per-question rule string; `Some(raw)` when the rule
    /// exists and holds. Unparseable rules never hold.
    fn question_rule<'a>(
        &'a self,
        answers: &AnswerMap,
        pick: impl Fn(&'a survey_spec::QuestionSpec) -> Option<&'a str>,
    ) -> Option<&'a str> {
        let question = self.visible.get(self.index)?;
        let raw = pick(question)?;
        let holds = RuleExpr::parse(raw)
            .is_some_and(|expr| expr.evaluate(answers, self.visible.items()));
        holds.then_some(raw)
    }

    fn stop_auto_media(&mut self) {
        if self.capturing
            && let Some(capture) = &mut self.services.capture
        {
            self.capturing = false;
            match capture.stop() {
                Ok(photos) => {
                    for photo in photos {
                        self.enqueue_auto_media(photo);
                    }
                }
                Err(error) => warn!(%error, "photo capture failed to stop"),
            }
        }
        if self.recording
            && let Some(recorder) = &mut self.services.recorder
        {
            self.recording = false;
            match recorder.stop() {
                Ok(audio) => self.enqueue_auto_media(audio),
                Err(error) => warn!(%error, "audio recorder failed to stop"),
            }
        }
    }

    /// Queues a recorded or captured file under the reserved hidden
    /// media question. Without that question the file stays local.
    fn enqueue_auto_media(&mut self, path: PathBuf) {
        let Some(target) = self.visible.auto_media.as_ref() else {
            warn!(path = %path.display(), "no media question in schema; file not uploaded");
            return;
        };
        let question_id = target.id.clone();
        let sub_field = target.sub_field().map(str::to_string);
        let request = self
            .uploads
            .begin(&self.document.id, &question_id, sub_field.as_deref(), path);
        self.outbox.push(request);
    }

    /// Upload requests produced since the last drain. The host forwards
    /// each to its upload service and echoes results back through
    /// [`SurveySession::on_upload_result`].
    pub fn take_upload_requests(&mut self) -> Vec<UploadRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Builds the final submission: cached page answers, uploaded file
    /// ids grouped per question, and the cached location fix.
    fn assemble(&mut self) -> AnswerSet {
        let mut answers = self.cache.collect();
        for upload in self.uploads.uploaded() {
            let sub = upload.sub_field.as_deref().unwrap_or_default();
            let entry = answers
                .entry(upload.question_id.clone())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if let Some(object) = entry.as_object_mut() {
                let files = object
                    .entry(sub.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Some(list) = files.as_array_mut() {
                    list.push(Value::String(upload.file_id.clone()));
                }
            }
        }
        if let Some(location_question) = &self.visible.location {
            let text = self
                .services
                .location
                .last_known()
                .map(|fix| fix.to_answer_text())
                .unwrap_or_default();
            let sub = location_question
                .children
                .first()
                .map(|child| child.id.as_str())
                .unwrap_or_default();
            merge_entry(&mut answers, &location_question.id, sub, Value::String(text));
        }

        self.services.location.stop_updates();
        self.cache.clear();
        self.uploads.reset();
        let elapsed_ms = self.started_at.elapsed().as_millis() as u64;
        info!(
            survey = self.document.id.as_str(),
            elapsed_ms, "submission assembled"
        );
        AnswerSet::new(self.document.id.clone(), answers, elapsed_ms)
    }
}
