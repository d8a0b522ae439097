//! AnnotationClient trait, the only boundary to the annotation service.
//!
//! Two implementations: [`HttpAnnotationClient`] talks to the service over
//! HTTP, [`InMemoryAnnotationClient`] serves a fixed queue of documents and
//! records submissions. Neither retries; failures go straight to the caller.

pub mod http;
pub mod in_memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AnnotatedDocument, AnnotatedText, Judgment};

pub use http::HttpAnnotationClient;
pub use in_memory::{InMemoryAnnotationClient, Submission};

pub const GET_DOC_PATH: &str = "/api/get_doc";
pub const ANNOTATE_PATH: &str = "/api/annotate";
pub const STORE_JUDGMENTS_PATH: &str = "/api/store_judgments";

#[async_trait]
pub trait AnnotationClient: Send + Sync {
    /// Next document awaiting review, `None` once the source is exhausted.
    async fn fetch_next_document(&self) -> Result<Option<AnnotatedDocument>>;

    /// Annotate free text, outside the review loop.
    async fn annotate(&self, query: &str) -> Result<AnnotatedText>;

    /// Store judgments for a document. The response body is not inspected.
    async fn submit_judgments(
        &self,
        document_id: &str,
        original_text: &str,
        judgments: &[Judgment],
    ) -> Result<()>;
}
