//! Elasticsearch document API client.
//!
//! Only two calls are made: create a document in an index and read one back
//! by id. Both carry basic auth. No retries.

use super::schema::{CreateEnvelope, FetchEnvelope, StoredDocument};
use crate::config::{Credentials, StoreConfig};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Characters of a remote error body kept in logs.
const BODY_EXCERPT_LEN: usize = 200;
/// Characters of fetched content echoed at debug level.
const CONTENT_PREVIEW_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {id} not found in {index}")]
    NotFound { index: String, id: String },

    #[error("store returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed store response: {0}")]
    MalformedResponse(String),

    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Create/read access to documents holding a single `content` field.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with `content = payload`; returns the assigned id.
    async fn create(&self, index: &str, payload: &str) -> Result<String, StoreError>;

    /// Return the `content` field of document `id`, as stored.
    async fn fetch(&self, index: &str, id: &str) -> Result<String, StoreError>;
}

pub struct ElasticStore {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl ElasticStore {
    pub fn new(config: &StoreConfig, credentials: Credentials) -> Result<Self, StoreError> {
        let mut builder = Client::builder().danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if config.accept_invalid_certs {
            tracing::warn!(
                url = %config.url,
                "TLS certificate validation is DISABLED for the document store"
            );
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn doc_url(&self, index: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => format!(
                "{}/{}/_doc/{}",
                self.base_url,
                urlencoding::encode(index),
                urlencoding::encode(id)
            ),
            None => format!("{}/{}/_doc", self.base_url, urlencoding::encode(index)),
        }
    }

    async fn status_error(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        StoreError::Status {
            status,
            body: excerpt(&body, BODY_EXCERPT_LEN).to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for ElasticStore {
    async fn create(&self, index: &str, payload: &str) -> Result<String, StoreError> {
        let response = self
            .client
            .post(self.doc_url(index, None))
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(&StoredDocument {
                content: payload.to_string(),
            })
            .send()
            .await
            .inspect_err(|e| tracing::error!(index, error = %e, "Error indexing data"))?;

        if !response.status().is_success() {
            let err = Self::status_error(response).await;
            tracing::error!(index, error = %err, "Error indexing data");
            return Err(err);
        }

        let envelope: CreateEnvelope = response.json().await?;
        let id = envelope
            .id
            .ok_or_else(|| StoreError::MalformedResponse("missing _id".to_string()))?;
        tracing::info!(
            index,
            document_id = %id,
            result = envelope.result.as_deref().unwrap_or("unknown"),
            "Data indexed successfully"
        );
        Ok(id)
    }

    async fn fetch(&self, index: &str, id: &str) -> Result<String, StoreError> {
        let response = self
            .client
            .get(self.doc_url(index, Some(id)))
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .inspect_err(|e| tracing::error!(index, id, error = %e, "Error retrieving file data"))?;

        let not_found = || StoreError::NotFound {
            index: index.to_string(),
            id: id.to_string(),
        };

        if response.status() == StatusCode::NOT_FOUND {
            tracing::error!(index, id, "Error retrieving file data: not found");
            return Err(not_found());
        }
        if !response.status().is_success() {
            let err = Self::status_error(response).await;
            tracing::error!(index, id, error = %err, "Error retrieving file data");
            return Err(err);
        }

        let envelope: FetchEnvelope = response.json().await?;
        if !envelope.found {
            return Err(not_found());
        }
        let content = envelope
            .source
            .and_then(|s| s.content)
            .ok_or_else(|| StoreError::MalformedResponse("missing _source.content".to_string()))?;
        tracing::debug!(
            index,
            id,
            preview = excerpt(&content, CONTENT_PREVIEW_LEN),
            "Fetched document"
        );
        Ok(content)
    }
}

/// Longest prefix of `s` with at most `max` characters.
fn excerpt(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
