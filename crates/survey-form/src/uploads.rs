use std::path::PathBuf;

use tracing::{debug, warn};

/// Opaque handle issued when an upload is enqueued and echoed back with
/// its result, so completions correlate by id rather than by filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploadJobId(u64);

/// One file the embedding shell must push to the upload service.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub job: UploadJobId,
    pub survey_id: String,
    pub question_id: String,
    pub path: PathBuf,
}

/// Fields of a successful upload response the engine keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_id: String,
    pub original_name: String,
}

#[derive(Debug, Clone)]
struct PendingJob {
    id: UploadJobId,
    question_id: String,
    sub_field: Option<String>,
    path: PathBuf,
}

/// A finished upload waiting to be merged into the submission payload.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StoredUpload {
    pub question_id: String,
    pub sub_field: Option<String>,
    pub file_id: String,
}

/// Tracks in-flight uploads and holds a requested submission open until
/// the last one settles. Failed uploads drain the counter the same as
/// successes so a dead upload service can never wedge submission.
#[derive(Debug, Default)]
pub struct UploadTracker {
    next_id: u64,
    pending: Vec<PendingJob>,
    uploaded: Vec<StoredUpload>,
    deferred_submit: bool,
}

impl UploadTracker {
    pub fn begin(
        &mut self,
        survey_id: &str,
        question_id: &str,
        sub_field: Option<&str>,
        path: PathBuf,
    ) -> UploadRequest {
        self.next_id += 1;
        let id = UploadJobId(self.next_id);
        debug!(job = self.next_id, question = question_id, path = %path.display(), "upload enqueued");
        self.pending.push(PendingJob {
            id,
            question_id: question_id.to_string(),
            sub_field: sub_field.map(str::to_string),
            path: path.clone(),
        });
        UploadRequest {
            job: id,
            survey_id: survey_id.to_string(),
            question_id: question_id.to_string(),
            path,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_uploading(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Marks that a submission is waiting for the counter to drain.
    pub fn defer_submit(&mut self) {
        self.deferred_submit = true;
    }

    pub fn submit_deferred(&self) -> bool {
        self.deferred_submit
    }

    /// Settles one job. Returns true when this was the last pending job
    /// and a deferred submission should fire now.
    pub fn resolve(&mut self, job: UploadJobId, result: Result<UploadedFile, String>) -> bool {
        let Some(position) = self.pending.iter().position(|pending| pending.id == job) else {
            warn!(job = job.0, "upload result for unknown job ignored");
            return false;
        };
        let settled = self.pending.swap_remove(position);
        match result {
            Ok(file) => {
                debug!(
                    job = job.0,
                    question = settled.question_id.as_str(),
                    file_id = file.file_id.as_str(),
                    name = file.original_name.as_str(),
                    "upload finished"
                );
                self.uploaded.push(StoredUpload {
                    question_id: settled.question_id,
                    sub_field: settled.sub_field,
                    file_id: file.file_id,
                });
            }
            Err(message) => {
                warn!(
                    job = job.0,
                    question = settled.question_id.as_str(),
                    path = %settled.path.display(),
                    error = message.as_str(),
                    "upload failed; file omitted from submission"
                );
            }
        }
        if self.pending.is_empty() && self.deferred_submit {
            self.deferred_submit = false;
            return true;
        }
        false
    }

    pub(crate) fn uploaded(&self) -> &[StoredUpload] {
        &self.uploaded
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.uploaded.clear();
        self.deferred_submit = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_file(id: &str) -> Result<UploadedFile, String> {
        Ok(UploadedFile {
            file_id: id.to_string(),
            original_name: format!("{id}.jpg"),
        })
    }

    #[test]
    fn deferred_submission_fires_when_last_job_settles() {
        let mut tracker = UploadTracker::default();
        let a = tracker.begin("s1", "q9", Some("sub"), PathBuf::from("/tmp/a.jpg"));
        let b = tracker.begin("s1", "q9", Some("sub"), PathBuf::from("/tmp/b.jpg"));
        tracker.defer_submit();

        assert!(!tracker.resolve(a.job, ok_file("f-a")));
        assert!(tracker.resolve(b.job, ok_file("f-b")));
        assert!(!tracker.submit_deferred());
        assert_eq!(tracker.uploaded().len(), 2);
    }

    #[test]
    fn failure_drains_counter_without_recording_file() {
        let mut tracker = UploadTracker::default();
        let job = tracker.begin("s1", "q9", None, PathBuf::from("/tmp/a.jpg"));
        tracker.defer_submit();

        assert!(tracker.resolve(job.job, Err("timeout".to_string())));
        assert!(tracker.uploaded().is_empty());
    }

    #[test]
    fn unknown_job_is_ignored() {
        let mut tracker = UploadTracker::default();
        let real = tracker.begin("s1", "q9", None, PathBuf::from("/tmp/a.jpg"));
        assert!(!tracker.resolve(UploadJobId(999), ok_file("ghost")));
        assert_eq!(tracker.pending_count(), 1);
        tracker.resolve(real.job, ok_file("f"));
        assert_eq!(tracker.uploaded().len(), 1);
    }
}
