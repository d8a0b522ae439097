//! tapioca-review - Entity-linking overlay and gold-standard review loop
//!
//! Renders entity-linking annotations over free text and drives the human
//! review loop that collects one validity judgment per candidate link.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐  payload  ┌──────────────────┐  intents  ┌──────────────────┐
//! │ AnnotationClient │ ────────► │  ReviewSession   │ ◄──────── │   UI / CLI       │
//! │ (HTTP, memory)   │ ◄──────── │                  │ ────────► │                  │
//! └──────────────────┘ judgments └──────────────────┘ RenderTree└──────────────────┘
//!                                         │
//!                                         ▼
//!                              overlay: merge → panel → render → html
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tapioca_review::{ClientConfig, HttpAnnotationClient, ReviewSession};
//!
//! # async fn run() -> tapioca_review::Result<()> {
//! let client = HttpAnnotationClient::new(ClientConfig::from_env()?)?;
//! let mut session = ReviewSession::new(client);
//! session.start().await?;
//! session.toggle("Q90", 0, 5, true)?;
//! session.submit().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod gold;
pub mod overlay;
pub mod query;
pub mod session;
pub mod types;

pub use client::{AnnotationClient, HttpAnnotationClient, InMemoryAnnotationClient, Submission};
pub use config::ClientConfig;
pub use error::{LayoutError, Result, ReviewError};
pub use overlay::{render, to_html, RenderMode, RenderNode, RenderTree};
pub use query::annotate_and_render;
pub use session::{Advance, ReviewIntent, ReviewSession, SessionState};
pub use types::{AnnotatedDocument, AnnotatedText, Annotation, Candidate, Document, Judgment};
