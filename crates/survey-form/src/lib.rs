//! Paginated survey form engine.
//!
//! [`SurveySession`] drives one answering pass over a survey document:
//! it renders one question per page, captures answers into a cache on
//! every navigation, and runs the survey's rule strings ahead of each
//! forward step. Once the upload queue drains it assembles the
//! submission payload, merging in uploaded file ids and the cached
//! location fix.

#![allow(missing_docs)]

pub mod media;
pub mod page;
pub mod services;
pub mod session;
pub mod store;
pub mod uploads;

pub use media::{AudioRecorder, MediaError, PhotoCapture};
pub use page::{BlankField, ChoiceRow, InlineBlank, Page, PageBody, ScrollPolicy, SelectItem};
pub use services::{LocationFix, LocationProvider, NoLocation, SessionSettings};
pub use session::{
    BlockReason, NavButtons, Progress, SessionServices, StepOutcome, SubmitOutcome, SurveySession,
};
pub use uploads::{UploadJobId, UploadRequest, UploadTracker, UploadedFile};
