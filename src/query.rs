//! Free-form query flow
//!
//! Annotates arbitrary text and renders it display-only: same overlay
//! structure as review, no judgment controls, no session state.

use crate::client::AnnotationClient;
use crate::error::Result;
use crate::overlay::{render, RenderMode, RenderTree};

pub async fn annotate_and_render<C>(client: &C, query: &str) -> Result<RenderTree>
where
    C: AnnotationClient + ?Sized,
{
    let response = client.annotate(query).await?;
    tracing::debug!(
        chars = response.text.chars().count(),
        annotations = response.annotations.len(),
        "annotated query"
    );
    Ok(render(&response.text, &response.annotations, RenderMode::Query))
}
