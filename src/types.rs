//! Wire types shared with the annotation service
//!
//! ## Rules
//!
//! 1. Field names follow the service's JSON (`tags`, `best_qid`,
//!    `log_likelihood`, `desc`, `nb_statements`, ...) via `#[serde(rename)]`
//! 2. Unknown fields are ignored, the service sends more than we render
//! 3. Offsets count Unicode scalar values, not bytes

use serde::{Deserialize, Serialize};

/// Base URL for a document identifier link
pub const DOI_BASE_URL: &str = "https://doi.org/";

// ============================================================================
// DOCUMENTS
// ============================================================================

/// Document under review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque identifier, a DOI for the gold-standard corpus
    pub id: String,
    /// Raw text, judgments are submitted against this exact string
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    pub fn doi_url(&self) -> String {
        format!("{}{}", DOI_BASE_URL, self.id)
    }
}

/// Response of `GET /api/get_doc`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    #[serde(rename = "doi")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl AnnotatedDocument {
    pub fn into_parts(self) -> (Document, Vec<Annotation>) {
        (
            Document {
                id: self.id,
                text: self.text,
            },
            self.annotations,
        )
    }
}

/// Response of `POST /api/annotate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedText {
    pub text: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

// ============================================================================
// ANNOTATIONS
// ============================================================================

/// A mention span with its ranked candidate entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Start character position (inclusive)
    pub start: usize,
    /// End character position (exclusive)
    pub end: usize,
    #[serde(rename = "tags", default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "best_qid", default)]
    pub best_candidate_id: Option<String>,
    /// Log likelihood of the phrase under the service's language model
    #[serde(rename = "log_likelihood", default)]
    pub phrase_score: f64,
}

impl Annotation {
    /// Identifies the mention among others in the same document.
    pub fn key(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Identifies one candidate of this mention.
    pub fn tag_key(&self, candidate_id: &str) -> (usize, usize, String) {
        (self.start, self.end, candidate_id.to_string())
    }

    pub fn is_predicted(&self, candidate: &Candidate) -> bool {
        self.best_candidate_id.as_deref() == Some(candidate.id.as_str())
    }
}

/// One proposed entity for a mention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Stable entity identifier (Wikidata QID)
    pub id: String,
    #[serde(default)]
    pub label: Option<Vec<String>>,
    #[serde(rename = "desc", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rank: f64,
    #[serde(rename = "nb_statements", default)]
    pub statement_count: u64,
    #[serde(rename = "nb_sitelinks", default)]
    pub sitelink_count: u64,
    /// Classifier score, absent in the free-query flow
    #[serde(default)]
    pub score: Option<f64>,
}

impl Candidate {
    /// `"<first label> (<id>)"`, or the bare id when there is no label.
    pub fn display_label(&self) -> String {
        match self.label.as_ref().and_then(|labels| labels.first()) {
            Some(label) => format!("{} ({})", label, self.id),
            None => self.id.clone(),
        }
    }

    /// A zero score is treated the same as a missing one.
    pub fn visible_score(&self) -> Option<f64> {
        self.score.filter(|score| *score != 0.0)
    }
}

// ============================================================================
// JUDGMENTS
// ============================================================================

/// Human verdict on one candidate of one mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "qid")]
    pub candidate_id: String,
    pub valid: bool,
}
