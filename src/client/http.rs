//! HTTP client for the annotation service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::{AnnotationClient, ANNOTATE_PATH, GET_DOC_PATH, STORE_JUDGMENTS_PATH};
use crate::config::ClientConfig;
use crate::error::{Result, ReviewError};
use crate::types::{AnnotatedDocument, AnnotatedText, Judgment};

#[derive(Clone)]
pub struct HttpAnnotationClient {
    client: Client,
    config: ClientConfig,
}

impl HttpAnnotationClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ReviewError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let url = self.config.endpoint(path)?;
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await.map_err(transport)?;
        success_body(response).await
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<String> {
        let url = self.config.endpoint(path)?;
        tracing::debug!(%url, fields = form.len(), "POST");
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(transport)?;
        success_body(response).await
    }
}

#[async_trait]
impl AnnotationClient for HttpAnnotationClient {
    async fn fetch_next_document(&self) -> Result<Option<AnnotatedDocument>> {
        let body = self.get_text(GET_DOC_PATH).await?;
        parse_next_document(&body)
    }

    async fn annotate(&self, query: &str) -> Result<AnnotatedText> {
        let body = self.post_form(ANNOTATE_PATH, &[("query", query)]).await?;
        parse_json(&body)
    }

    async fn submit_judgments(
        &self,
        document_id: &str,
        original_text: &str,
        judgments: &[Judgment],
    ) -> Result<()> {
        let encoded = serde_json::to_string(judgments)
            .map_err(|e| ReviewError::Input(format!("cannot encode judgments: {}", e)))?;
        self.post_form(
            STORE_JUDGMENTS_PATH,
            &[
                ("doi", document_id),
                ("doc", original_text),
                ("judgments", encoded.as_str()),
            ],
        )
        .await?;

        tracing::info!(
            document_id,
            judgments = judgments.len(),
            "stored judgments"
        );
        Ok(())
    }
}

/// Network-level failure, including timeouts
fn transport(err: reqwest::Error) -> ReviewError {
    if err.is_timeout() {
        ReviewError::Transport(format!("request timed out: {}", err))
    } else {
        ReviewError::Transport(err.to_string())
    }
}

async fn success_body(response: Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        tracing::warn!(%status, "annotation service returned an error");
        return Err(ReviewError::Protocol(format!("HTTP {}: {}", status, text)));
    }
    response.text().await.map_err(transport)
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

/// An empty body, `null`, or a payload without a document id means there is
/// nothing left to review.
pub(crate) fn parse_next_document(body: &str) -> Result<Option<AnnotatedDocument>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value = parse_json(body)?;
    let has_id = value
        .get("doi")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|doi| !doi.is_empty());
    if !has_id {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}
