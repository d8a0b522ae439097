//! In-memory annotation client
//!
//! Serves a queue of prepared documents and records every submission.
//! Failures can be scripted to exercise the session's retry paths.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::AnnotationClient;
use crate::error::{Result, ReviewError};
use crate::types::{AnnotatedDocument, AnnotatedText, Annotation, Judgment};

/// One recorded `submit_judgments` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub document_id: String,
    pub text: String,
    pub judgments: Vec<Judgment>,
}

#[derive(Default)]
struct State {
    documents: VecDeque<AnnotatedDocument>,
    /// Annotations returned for a free query, keyed by exact query text
    query_annotations: Vec<(String, Vec<Annotation>)>,
    submissions: Vec<Submission>,
    failing_submits: usize,
    failing_fetches: usize,
}

#[derive(Clone, Default)]
pub struct InMemoryAnnotationClient {
    state: Arc<Mutex<State>>,
}

impl InMemoryAnnotationClient {
    pub fn new(documents: impl IntoIterator<Item = AnnotatedDocument>) -> Self {
        let client = Self::default();
        client.lock().documents.extend(documents);
        client
    }

    /// Annotations to return when `query` is annotated.
    pub fn with_query(self, query: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        self.lock().query_annotations.push((query.into(), annotations));
        self
    }

    /// Fail the next `count` submissions with a transport error.
    pub fn fail_next_submits(&self, count: usize) {
        self.lock().failing_submits = count;
    }

    /// Fail the next `count` fetches with a protocol error.
    pub fn fail_next_fetches(&self, count: usize) {
        self.lock().failing_fetches = count;
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.lock().submissions.clone()
    }

    pub fn remaining_documents(&self) -> usize {
        self.lock().documents.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // a poisoned lock only means a test panicked mid-call
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AnnotationClient for InMemoryAnnotationClient {
    async fn fetch_next_document(&self) -> Result<Option<AnnotatedDocument>> {
        let mut state = self.lock();
        if state.failing_fetches > 0 {
            state.failing_fetches -= 1;
            return Err(ReviewError::Protocol("HTTP 503: scripted failure".into()));
        }
        Ok(state.documents.pop_front())
    }

    async fn annotate(&self, query: &str) -> Result<AnnotatedText> {
        let state = self.lock();
        let annotations = state
            .query_annotations
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, annotations)| annotations.clone())
            .unwrap_or_default();
        Ok(AnnotatedText {
            text: query.to_string(),
            annotations,
        })
    }

    async fn submit_judgments(
        &self,
        document_id: &str,
        original_text: &str,
        judgments: &[Judgment],
    ) -> Result<()> {
        let mut state = self.lock();
        if state.failing_submits > 0 {
            state.failing_submits -= 1;
            return Err(ReviewError::Transport("connection reset".into()));
        }
        state.submissions.push(Submission {
            document_id: document_id.to_string(),
            text: original_text.to_string(),
            judgments: judgments.to_vec(),
        });
        Ok(())
    }
}
