//! Review session
//!
//! Drives the gold-standard loop for one reviewer:
//!
//! ```text
//! Idle ──start()──► AwaitingDocument ──fetched──► Displaying ──submit()──► Submitting
//!                        ▲    │ exhausted                                    │
//!                        │    ▼                                              │
//!                        │   Idle                                            │
//!                        └──────────────────── stored ◄──────────────────────┘
//! ```
//!
//! The session owns the current document, its annotations, and the render
//! tree whose judgment controls hold the reviewer's selections. The UI never
//! mutates that state directly: it emits [`ReviewIntent`]s and the session
//! applies them. Every operation takes `&mut self`, so a session can only
//! have one request in flight.

use crate::client::AnnotationClient;
use crate::error::{Result, ReviewError};
use crate::overlay::{check_layout, render, to_html, RenderMode, RenderTree};
use crate::types::{Annotation, Document, Judgment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingDocument,
    Displaying,
    Submitting,
}

/// User intents emitted by the rendered overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewIntent {
    /// A judgment checkbox changed
    Toggle {
        candidate_id: String,
        start: usize,
        end: usize,
        checked: bool,
    },
    /// Store the current judgments and move on
    Submit,
    /// Move on without storing anything
    Skip,
}

/// Outcome of a transition that fetches a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Loaded,
    /// The document source has nothing left to review
    Exhausted,
    /// Only returned by `submit()`: the judgments were stored but fetching
    /// the next document failed. The session is in `AwaitingDocument`, so
    /// retry with `next_doc()`, not `submit()`.
    FetchFailed(ReviewError),
}

pub struct ReviewSession<C> {
    client: C,
    state: SessionState,
    document: Option<Document>,
    annotations: Vec<Annotation>,
    tree: Option<RenderTree>,
    submitted: usize,
}

impl<C: AnnotationClient> ReviewSession<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: SessionState::Idle,
            document: None,
            annotations: Vec::new(),
            tree: None,
            submitted: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn tree(&self) -> Option<&RenderTree> {
        self.tree.as_ref()
    }

    pub fn html(&self) -> Option<String> {
        self.tree.as_ref().map(to_html)
    }

    /// Number of documents whose judgments were stored by this session
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub async fn start(&mut self) -> Result<Advance> {
        self.next_doc().await
    }

    /// Drop the current document and fetch the next one.
    ///
    /// Allowed from `AwaitingDocument` as well, to retry a failed fetch.
    pub async fn next_doc(&mut self) -> Result<Advance> {
        if self.state == SessionState::Submitting {
            return Err(ReviewError::Input(
                "cannot fetch a document while judgments are pending submission".into(),
            ));
        }
        self.load_next().await
    }

    /// Record the state of one judgment control.
    pub fn toggle(&mut self, candidate_id: &str, start: usize, end: usize, checked: bool) -> Result<()> {
        if self.state != SessionState::Displaying {
            return Err(ReviewError::Input(format!(
                "toggle is only valid while displaying a document (state: {:?})",
                self.state
            )));
        }
        // a candidate listed twice for one mention renders one control per row
        let mut matched = 0;
        if let Some(tree) = self.tree.as_mut() {
            for control in tree
                .controls_mut()
                .filter(|control| control.matches(candidate_id, start, end))
            {
                control.checked = checked;
                matched += 1;
            }
        }
        if matched == 0 {
            return Err(ReviewError::Input(format!(
                "no judgment control for {} at {}..{}",
                candidate_id, start, end
            )));
        }
        Ok(())
    }

    /// Snapshot of every rendered control, unchecked ones as `valid = false`.
    pub fn judgments(&self) -> Result<Vec<Judgment>> {
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| ReviewError::Input("no document loaded".into()))?;
        Ok(tree
            .controls()
            .map(|control| Judgment {
                start: control.start,
                end: control.end,
                candidate_id: control.candidate_id.clone(),
                valid: control.checked,
            })
            .collect())
    }

    /// Store the judgments for the current document, then fetch the next one.
    ///
    /// An `Err` means nothing was stored: the session stays in `Submitting`
    /// with its selections intact and `submit()` may be called again. Once
    /// the store succeeds the call returns `Ok`, with a failed follow-up
    /// fetch reported as [`Advance::FetchFailed`].
    pub async fn submit(&mut self) -> Result<Advance> {
        if !matches!(
            self.state,
            SessionState::Displaying | SessionState::Submitting
        ) {
            return Err(ReviewError::Input(format!(
                "submit requires a displayed document (state: {:?})",
                self.state
            )));
        }
        let judgments = self.judgments()?;
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| ReviewError::Input("no document loaded".into()))?;
        self.state = SessionState::Submitting;

        if let Err(err) = self
            .client
            .submit_judgments(&document.id, &document.text, &judgments)
            .await
        {
            tracing::warn!(
                document_id = %document.id,
                error = %err,
                "judgment submission failed, keeping selections"
            );
            return Err(err);
        }

        self.submitted += 1;
        tracing::info!(
            document_id = %document.id,
            judgments = judgments.len(),
            submitted = self.submitted,
            "judgments stored"
        );
        match self.load_next().await {
            Ok(advance) => Ok(advance),
            Err(err) => Ok(Advance::FetchFailed(err)),
        }
    }

    /// Apply one intent from the overlay. Toggles produce no advance.
    pub async fn dispatch(&mut self, intent: ReviewIntent) -> Result<Option<Advance>> {
        match intent {
            ReviewIntent::Toggle {
                candidate_id,
                start,
                end,
                checked,
            } => {
                self.toggle(&candidate_id, start, end, checked)?;
                Ok(None)
            }
            ReviewIntent::Submit => self.submit().await.map(Some),
            ReviewIntent::Skip => self.next_doc().await.map(Some),
        }
    }

    async fn load_next(&mut self) -> Result<Advance> {
        self.state = SessionState::AwaitingDocument;
        self.document = None;
        self.annotations.clear();
        self.tree = None;

        let payload = match self.client.fetch_next_document().await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch next document");
                return Err(err);
            }
        };

        let Some(payload) = payload else {
            tracing::info!(submitted = self.submitted, "no documents left to review");
            self.state = SessionState::Idle;
            return Ok(Advance::Exhausted);
        };

        let (document, annotations) = payload.into_parts();
        if let Err(violation) = check_layout(&document.text, &annotations) {
            tracing::warn!(
                document_id = %document.id,
                %violation,
                "annotation spans are not sorted and disjoint, rendering best-effort"
            );
        }

        let tree = render(&document.text, &annotations, RenderMode::Review);
        tracing::info!(
            document_id = %document.id,
            mentions = tree.mention_count(),
            controls = tree.controls().count(),
            "displaying document"
        );

        self.document = Some(document);
        self.annotations = annotations;
        self.tree = Some(tree);
        self.state = SessionState::Displaying;
        Ok(Advance::Loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryAnnotationClient;
    use crate::types::{AnnotatedDocument, Candidate};

    fn candidate(id: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            label: None,
            description: None,
            rank: 0.0,
            statement_count: 0,
            sitelink_count: 0,
            score: None,
        }
    }

    fn doc(id: &str) -> AnnotatedDocument {
        AnnotatedDocument {
            id: id.to_string(),
            text: "Berlin and Bonn".to_string(),
            annotations: vec![
                Annotation {
                    start: 0,
                    end: 6,
                    candidates: vec![candidate("Q64"), candidate("Q821244")],
                    best_candidate_id: Some("Q64".into()),
                    phrase_score: -2.0,
                },
                Annotation {
                    start: 11,
                    end: 15,
                    candidates: vec![candidate("Q586")],
                    best_candidate_id: None,
                    phrase_score: -4.0,
                },
            ],
        }
    }

    #[tokio::test]
    async fn start_displays_first_document() {
        let mut session = ReviewSession::new(InMemoryAnnotationClient::new([doc("a")]));
        assert_eq!(session.state(), SessionState::Idle);

        assert_eq!(session.start().await.unwrap(), Advance::Loaded);
        assert_eq!(session.state(), SessionState::Displaying);
        assert_eq!(session.document().map(|d| d.id.as_str()), Some("a"));
        assert_eq!(session.annotations().len(), 2);
        assert_eq!(session.judgments().unwrap().len(), 3);
        assert!(session.html().unwrap().contains("data-qid=\"Q586\""));
    }

    #[tokio::test]
    async fn toggle_outside_displaying_is_an_input_error() {
        let mut session = ReviewSession::new(InMemoryAnnotationClient::default());
        let err = session.toggle("Q64", 0, 6, true).unwrap_err();
        assert!(matches!(err, ReviewError::Input(_)));
    }

    #[tokio::test]
    async fn toggle_unknown_control_is_an_input_error() {
        let mut session = ReviewSession::new(InMemoryAnnotationClient::new([doc("a")]));
        session.start().await.unwrap();
        let err = session.toggle("Q64", 0, 5, true).unwrap_err();
        assert!(matches!(err, ReviewError::Input(_)));
    }

    #[tokio::test]
    async fn submit_without_document_is_an_input_error() {
        let client = InMemoryAnnotationClient::default();
        let mut session = ReviewSession::new(client.clone());
        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, ReviewError::Input(_)));
        assert!(client.submissions().is_empty());
    }

    #[tokio::test]
    async fn exhausted_source_returns_to_idle() {
        let mut session = ReviewSession::new(InMemoryAnnotationClient::new([doc("a")]));
        session.start().await.unwrap();
        assert_eq!(session.submit().await.unwrap(), Advance::Exhausted);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.document().is_none());
        assert_eq!(session.submitted(), 1);
    }

    #[tokio::test]
    async fn failed_submit_keeps_selections_for_retry() {
        let client = InMemoryAnnotationClient::new([doc("a"), doc("b")]);
        let mut session = ReviewSession::new(client.clone());
        session.start().await.unwrap();
        session.toggle("Q586", 11, 15, true).unwrap();

        client.fail_next_submits(1);
        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, ReviewError::Transport(_)));
        assert_eq!(session.state(), SessionState::Submitting);
        assert!(client.submissions().is_empty());

        // toggles are frozen while a submission is pending
        assert!(session.toggle("Q64", 0, 6, true).is_err());
        assert!(session.next_doc().await.is_err());

        assert_eq!(session.submit().await.unwrap(), Advance::Loaded);
        let submissions = client.submissions();
        assert_eq!(submissions.len(), 1);
        let valid: Vec<_> = submissions[0]
            .judgments
            .iter()
            .filter(|j| j.valid)
            .map(|j| j.candidate_id.as_str())
            .collect();
        assert_eq!(valid, vec!["Q586"]);
        assert_eq!(session.document().map(|d| d.id.as_str()), Some("b"));
    }

    #[tokio::test]
    async fn failed_fetch_can_be_retried() {
        let client = InMemoryAnnotationClient::new([doc("a")]);
        client.fail_next_fetches(1);
        let mut session = ReviewSession::new(client);

        let err = session.start().await.unwrap_err();
        assert!(matches!(err, ReviewError::Protocol(_)));
        assert_eq!(session.state(), SessionState::AwaitingDocument);

        assert_eq!(session.next_doc().await.unwrap(), Advance::Loaded);
        assert_eq!(session.state(), SessionState::Displaying);
    }

    #[tokio::test]
    async fn dispatch_applies_intents() {
        let client = InMemoryAnnotationClient::new([doc("a"), doc("b"), doc("c")]);
        let mut session = ReviewSession::new(client.clone());
        session.start().await.unwrap();

        let toggled = session
            .dispatch(ReviewIntent::Toggle {
                candidate_id: "Q64".into(),
                start: 0,
                end: 6,
                checked: true,
            })
            .await
            .unwrap();
        assert_eq!(toggled, None);

        let skipped = session.dispatch(ReviewIntent::Skip).await.unwrap();
        assert_eq!(skipped, Some(Advance::Loaded));
        assert_eq!(session.document().map(|d| d.id.as_str()), Some("b"));
        // the skipped document's selection is gone with it
        assert!(session.judgments().unwrap().iter().all(|j| !j.valid));

        let submitted = session.dispatch(ReviewIntent::Submit).await.unwrap();
        assert_eq!(submitted, Some(Advance::Loaded));
        assert_eq!(client.submissions()[0].document_id, "b");
    }

    #[tokio::test]
    async fn stored_judgments_survive_a_failed_fetch() {
        let client = InMemoryAnnotationClient::new([doc("a"), doc("b")]);
        let mut session = ReviewSession::new(client.clone());
        session.start().await.unwrap();

        client.fail_next_fetches(1);
        let advance = session.submit().await.unwrap();
        assert!(matches!(advance, Advance::FetchFailed(ReviewError::Protocol(_))));
        assert_eq!(session.state(), SessionState::AwaitingDocument);
        assert_eq!(session.submitted(), 1);
        assert_eq!(client.submissions().len(), 1);

        // nothing left to resubmit, the fetch is retried instead
        assert!(matches!(
            session.submit().await.unwrap_err(),
            ReviewError::Input(_)
        ));
        assert_eq!(session.next_doc().await.unwrap(), Advance::Loaded);
        assert_eq!(session.document().map(|d| d.id.as_str()), Some("b"));
        assert_eq!(client.submissions().len(), 1);
    }

    #[tokio::test]
    async fn toggle_reaches_every_row_of_a_repeated_candidate() {
        let mut repeated = doc("a");
        repeated.annotations[1].candidates = vec![candidate("Q586"), candidate("Q586")];
        let mut session = ReviewSession::new(InMemoryAnnotationClient::new([repeated]));
        session.start().await.unwrap();

        session.toggle("Q586", 11, 15, true).unwrap();
        let checked: Vec<_> = session
            .judgments()
            .unwrap()
            .into_iter()
            .filter(|j| j.candidate_id == "Q586")
            .map(|j| j.valid)
            .collect();
        assert_eq!(checked, vec![true, true]);
    }
}
