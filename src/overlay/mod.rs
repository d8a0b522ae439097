//! Annotation overlay
//!
//! Turns a document and its annotation spans into a render tree: plain-text
//! runs interleaved with annotated mentions, each mention carrying its
//! candidate panel. Rendering is pure and synchronous.
//!
//! ```text
//! text + spans ──► merge() ──► [Segment] ──► render() ──► RenderTree ──► to_html()
//!                                  │
//!                   CandidatePanel::build() per mention
//! ```

pub mod html;
pub mod merge;
pub mod panel;

use serde::Serialize;

pub use html::to_html;
pub use merge::{check_layout, merge, Segment};
pub use panel::{entity_url, CandidatePanel, CandidateRow, JudgmentControl};

use crate::types::Annotation;

/// Which flow the overlay is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Gold-standard review, one judgment control per candidate
    Review,
    /// Free-form query, display only
    Query,
}

impl RenderMode {
    pub fn includes_controls(self) -> bool {
        matches!(self, RenderMode::Review)
    }
}

/// One node of the rendered overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderNode {
    PlainText {
        content: String,
    },
    AnnotatedSpan {
        /// Position of the annotation in the input list
        index: usize,
        mention: String,
        panel: CandidatePanel,
    },
}

/// Rendered overlay, in reading order of the original text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTree {
    pub nodes: Vec<RenderNode>,
}

impl RenderTree {
    pub fn panels(&self) -> impl Iterator<Item = &CandidatePanel> {
        self.nodes.iter().filter_map(|node| match node {
            RenderNode::AnnotatedSpan { panel, .. } => Some(panel),
            RenderNode::PlainText { .. } => None,
        })
    }

    /// Every judgment control, in reading order.
    pub fn controls(&self) -> impl Iterator<Item = &JudgmentControl> {
        self.panels().flat_map(|panel| panel.controls())
    }

    pub fn controls_mut(&mut self) -> impl Iterator<Item = &mut JudgmentControl> {
        self.nodes
            .iter_mut()
            .filter_map(|node| match node {
                RenderNode::AnnotatedSpan { panel, .. } => Some(panel),
                RenderNode::PlainText { .. } => None,
            })
            .flat_map(|panel| panel.rows.iter_mut().filter_map(|row| row.control.as_mut()))
    }

    pub fn mention_count(&self) -> usize {
        self.panels().count()
    }

    /// Concatenated text of all nodes, equal to the source text for a
    /// well-formed span list.
    pub fn plain_text(&self) -> String {
        self.nodes
            .iter()
            .map(|node| match node {
                RenderNode::PlainText { content } => content.as_str(),
                RenderNode::AnnotatedSpan { mention, .. } => mention.as_str(),
            })
            .collect()
    }
}

/// Render `text` with its annotations.
pub fn render(text: &str, annotations: &[Annotation], mode: RenderMode) -> RenderTree {
    let include_controls = mode.includes_controls();
    let nodes: Vec<RenderNode> = merge(text, annotations)
        .into_iter()
        .map(|segment| match segment {
            Segment::PlainText(content) => RenderNode::PlainText {
                content: content.to_string(),
            },
            Segment::AnnotatedSpan {
                mention,
                index,
                annotation,
            } => RenderNode::AnnotatedSpan {
                index,
                mention: mention.to_string(),
                panel: CandidatePanel::build(annotation, include_controls),
            },
        })
        .collect();

    tracing::debug!(
        nodes = nodes.len(),
        annotations = annotations.len(),
        ?mode,
        "rendered overlay"
    );

    RenderTree { nodes }
}
