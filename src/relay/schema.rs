use serde::{Deserialize, Serialize};

/// Body of a document as stored in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredDocument {
    pub content: String,
}

/// Envelope returned by `POST /<index>/_doc`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEnvelope {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub result: Option<String>,
}

/// Envelope returned by `GET /<index>/_doc/<id>`.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchEnvelope {
    #[serde(default = "default_found")]
    pub found: bool,
    #[serde(rename = "_source")]
    pub source: Option<SourceFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceFields {
    pub content: Option<String>,
}

fn default_found() -> bool {
    true
}

/// Successful upload response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(rename = "documentId")]
    pub document_id: String,
}

/// Successful export response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub message: String,
}
