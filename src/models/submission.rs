// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Submission of annotated files to the analysis backend.
//!
//! All selected files go out in one multipart request with indexed
//! `files[i]` fields, next to the JSON-encoded annotation store. The
//! annotation store is left untouched by a successful submission so the
//! same boxes can be sent again.

use super::selection::{SelectedFile, SelectionSet};
use super::session::Session;
use super::store::AnnotationStore;
use std::sync::Arc;

pub const STAGE_PREPARING: &str = "Preparing files for submission...";
pub const STAGE_UPLOADING: &str = "Uploading files and processing...";
pub const STAGE_DONE: &str = "Processing completed successfully!";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Please upload PDF files first")]
    EmptySelection,
    #[error("A submission is already in progress")]
    AlreadyInFlight,
    #[error("failed to encode annotations: {0}")]
    Encode(String),
}

/// One file part of the multipart body.
#[derive(Debug, Clone)]
pub struct PayloadFile {
    /// Form field name, `files[<index>]`
    pub field: String,
    pub file_name: String,
    pub bytes: Arc<Vec<u8>>,
}

/// Everything one submission request carries.
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub files: Vec<PayloadFile>,
    /// JSON form of the annotation store
    pub boxes: String,
    pub user_id: Option<String>,
}

impl SubmissionPayload {
    pub fn build(
        selection: &SelectionSet<SelectedFile>,
        store: &AnnotationStore,
        session: Option<&Session>,
    ) -> Result<Self, SubmissionError> {
        if selection.is_empty() {
            return Err(SubmissionError::EmptySelection);
        }

        let files = selection
            .files()
            .iter()
            .enumerate()
            .map(|(index, file)| PayloadFile {
                field: format!("files[{index}]"),
                file_name: file.name.clone(),
                bytes: Arc::clone(&file.bytes),
            })
            .collect();
        let boxes = serde_json::to_string(store).map_err(|e| SubmissionError::Encode(e.to_string()))?;

        Ok(Self {
            files,
            boxes,
            user_id: session.map(|s| s.user_id().to_string()),
        })
    }
}

/// What the UI shows about the latest submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight { stage: String },
    Succeeded(serde_json::Value),
    Failed(String),
}

/// Progress reported by the background submission worker.
#[derive(Debug)]
pub enum SubmissionEvent {
    Stage(String),
    Finished(Result<serde_json::Value, String>),
}

/// Tracks a single submission at a time.
#[derive(Debug, Default)]
pub struct Submission {
    state: SubmissionState,
}

impl Submission {
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, SubmissionState::InFlight { .. })
    }

    /// Validate and claim the in-flight slot. On success the returned
    /// payload must be sent; on failure nothing is sent.
    pub fn begin(
        &mut self,
        selection: &SelectionSet<SelectedFile>,
        store: &AnnotationStore,
        session: Option<&Session>,
    ) -> Result<SubmissionPayload, SubmissionError> {
        if self.is_in_flight() {
            return Err(SubmissionError::AlreadyInFlight);
        }
        match SubmissionPayload::build(selection, store, session) {
            Ok(payload) => {
                self.state = SubmissionState::InFlight {
                    stage: STAGE_PREPARING.to_string(),
                };
                Ok(payload)
            }
            Err(e) => {
                self.state = SubmissionState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Apply a worker event. Events arriving while idle are ignored.
    pub fn apply(&mut self, event: SubmissionEvent) {
        if !self.is_in_flight() {
            log::warn!("Ignoring submission event outside a submission: {:?}", event);
            return;
        }
        self.state = match event {
            SubmissionEvent::Stage(stage) => SubmissionState::InFlight { stage },
            SubmissionEvent::Finished(Ok(value)) => SubmissionState::Succeeded(value),
            SubmissionEvent::Finished(Err(message)) => SubmissionState::Failed(message),
        };
    }

    /// The worker went away without reporting a result.
    pub fn abandon(&mut self, message: &str) {
        if self.is_in_flight() {
            self.state = SubmissionState::Failed(message.to_string());
        }
    }

    /// Forget the last outcome, e.g. when a new selection is made.
    pub fn reset(&mut self) {
        if !self.is_in_flight() {
            self.state = SubmissionState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::AnnotationBox;
    use crate::models::session::SessionUser;
    use crate::models::store::PageKey;

    fn file(name: &str) -> SelectedFile {
        SelectedFile {
            name: name.to_string(),
            size: 3,
            bytes: Arc::new(vec![1, 2, 3]),
            document: Err("unused".into()),
        }
    }

    fn session() -> Session {
        Session {
            user: SessionUser {
                id: "u42".into(),
                email: None,
            },
            token: "t".into(),
        }
    }

    #[test]
    fn test_empty_selection_sends_nothing() {
        let mut submission = Submission::default();
        let result = submission.begin(&SelectionSet::default(), &AnnotationStore::new(), None);
        assert_eq!(result.unwrap_err(), SubmissionError::EmptySelection);
        match submission.state() {
            SubmissionState::Failed(message) => assert!(!message.is_empty()),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_payload_indexes_files_and_encodes_boxes() {
        let selection = SelectionSet::replace(vec![file("a.pdf"), file("b.pdf")]);
        let store = AnnotationStore::new().add_box(PageKey::new(1, 2), AnnotationBox::new(10.0, 10.0, 40.0, 30.0));

        let payload = SubmissionPayload::build(&selection, &store, Some(&session())).unwrap();
        let fields: Vec<(&str, &str)> = payload
            .files
            .iter()
            .map(|f| (f.field.as_str(), f.file_name.as_str()))
            .collect();
        assert_eq!(fields, vec![("files[0]", "a.pdf"), ("files[1]", "b.pdf")]);
        assert_eq!(payload.user_id.as_deref(), Some("u42"));

        let boxes: serde_json::Value = serde_json::from_str(&payload.boxes).unwrap();
        assert_eq!(
            boxes,
            serde_json::json!({"1": {"2": [{"x": 10.0, "y": 10.0, "width": 40.0, "height": 30.0}]}})
        );
    }

    #[test]
    fn test_anonymous_payload_has_no_user() {
        let selection = SelectionSet::replace(vec![file("a.pdf")]);
        let payload = SubmissionPayload::build(&selection, &AnnotationStore::new(), None).unwrap();
        assert_eq!(payload.user_id, None);
        assert_eq!(payload.boxes, "{}");
    }

    #[test]
    fn test_second_begin_is_refused_while_in_flight() {
        let selection = SelectionSet::replace(vec![file("a.pdf")]);
        let store = AnnotationStore::new();
        let mut submission = Submission::default();

        submission.begin(&selection, &store, None).unwrap();
        assert!(submission.is_in_flight());
        assert_eq!(
            submission.begin(&selection, &store, None).unwrap_err(),
            SubmissionError::AlreadyInFlight
        );
        assert!(submission.is_in_flight());
    }

    #[test]
    fn test_stage_then_success() {
        let selection = SelectionSet::replace(vec![file("a.pdf")]);
        let mut submission = Submission::default();
        submission.begin(&selection, &AnnotationStore::new(), None).unwrap();

        submission.apply(SubmissionEvent::Stage(STAGE_UPLOADING.into()));
        assert_eq!(
            submission.state(),
            &SubmissionState::InFlight {
                stage: STAGE_UPLOADING.into()
            }
        );

        let body = serde_json::json!({"message": "ok"});
        submission.apply(SubmissionEvent::Finished(Ok(body.clone())));
        assert_eq!(submission.state(), &SubmissionState::Succeeded(body));

        // a late event after completion changes nothing
        submission.apply(SubmissionEvent::Stage("late".into()));
        assert!(matches!(submission.state(), SubmissionState::Succeeded(_)));
    }

    #[test]
    fn test_failure_allows_retry() {
        let selection = SelectionSet::replace(vec![file("a.pdf")]);
        let store = AnnotationStore::new();
        let mut submission = Submission::default();
        submission.begin(&selection, &store, None).unwrap();
        submission.apply(SubmissionEvent::Finished(Err("Invalid boxes data format".into())));
        assert_eq!(
            submission.state(),
            &SubmissionState::Failed("Invalid boxes data format".into())
        );

        assert!(submission.begin(&selection, &store, None).is_ok());
    }

    #[test]
    fn test_abandon_and_reset() {
        let selection = SelectionSet::replace(vec![file("a.pdf")]);
        let mut submission = Submission::default();
        submission.begin(&selection, &AnnotationStore::new(), None).unwrap();
        submission.reset();
        assert!(submission.is_in_flight());

        submission.abandon("worker stopped");
        assert_eq!(submission.state(), &SubmissionState::Failed("worker stopped".into()));
        submission.reset();
        assert_eq!(submission.state(), &SubmissionState::Idle);
    }
}
