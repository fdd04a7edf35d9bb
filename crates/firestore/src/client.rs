use std::collections::BTreeMap;

use async_trait::async_trait;
use geopush_core::{DocumentId, RecordStore, StoreError, UserRecord};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{FirestoreError, Result};
use crate::value::{encode_record, Document, Value};

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE: &str = "(default)";
pub const USERS_COLLECTION: &str = "users";

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub database: String,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

pub struct FirestoreClient {
    client: Client,
    config: FirestoreConfig,
}

impl FirestoreClient {
    pub fn new(config: FirestoreConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: FirestoreConfig, client: Client) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents/{}",
            self.config.base_url, self.config.project_id, self.config.database, collection
        )
    }

    /// Create a document with a server-assigned id.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: BTreeMap<String, Value>,
    ) -> Result<Document> {
        let url = self.collection_url(collection);
        debug!(collection, "Creating Firestore document");

        let mut request = self.client.post(&url).json(&Document::with_fields(fields));
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) if !envelope.error.status.is_empty() => {
                    format!("{}: {}", envelope.error.status, envelope.error.message)
                }
                Ok(envelope) => envelope.error.message,
                Err(_) => body,
            };
            return Err(FirestoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Document>()
            .await
            .map_err(|e| FirestoreError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for FirestoreClient {
    async fn insert(
        &self,
        collection: &str,
        record: &UserRecord,
    ) -> std::result::Result<DocumentId, StoreError> {
        let document = self
            .create_document(collection, encode_record(record))
            .await?;

        let id = document.id().ok_or_else(|| {
            StoreError::InvalidResponse("document name missing from response".to_string())
        })?;

        info!(collection, document_id = id, "Record stored");
        Ok(DocumentId(id.to_string()))
    }
}
