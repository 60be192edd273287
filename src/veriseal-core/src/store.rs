//! Document store access: insert records, look them up by modified hash.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::config::SealConfig;
use crate::error::SealError;

/// The narrow store interface the pipeline consumes.
///
/// Records are indexed by `proof.modifiedHash`, never by the actual hash
/// directly, so a public ledger entry alone does not reveal the store's
/// indexing scheme.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a record document.
    async fn insert(&self, document: &Value) -> Result<(), SealError>;

    /// Fetch the single document whose `proof.modifiedHash` matches.
    async fn find_by_modified_hash(&self, modified_hash: &str)
        -> Result<Option<Value>, SealError>;
}

/// Data-API-backed document store client.
///
/// Speaks the MongoDB Atlas Data API: JSON actions posted to
/// `{endpoint}/action/insertOne` and `{endpoint}/action/findOne` with an
/// `api-key` header. One HTTP call per operation, bounded by the
/// configured timeout.
pub struct AtlasStore {
    client: Client,
    endpoint: String,
    api_key: String,
    data_source: String,
    database: String,
    collection: String,
}

impl AtlasStore {
    /// Create a store client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &SealConfig) -> Result<Self, SealError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(format!("veriseal/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SealError::Config {
                message: format!("failed to create store client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.store_endpoint.trim_end_matches('/').to_string(),
            api_key: config.store_api_key.clone(),
            data_source: config.store_data_source.clone(),
            database: config.store_database.clone(),
            collection: config.store_collection.clone(),
        })
    }

    /// Post one Data API action and return the response body.
    async fn action(&self, name: &str, body: Value) -> Result<Value, SealError> {
        let url = format!("{}/action/{name}", self.endpoint);
        debug!(%url, "store action");

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SealError::Store {
                message: format!("{name} request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SealError::Store {
                message: format!("{name} HTTP error {status}: {detail}"),
            });
        }

        response.json().await.map_err(|e| SealError::Store {
            message: format!("{name} returned malformed JSON: {e}"),
        })
    }

    /// The common action envelope naming the target collection.
    fn envelope(&self) -> Value {
        json!({
            "dataSource": self.data_source,
            "database": self.database,
            "collection": self.collection,
        })
    }
}

#[async_trait]
impl RecordStore for AtlasStore {
    #[instrument(skip(self, document))]
    async fn insert(&self, document: &Value) -> Result<(), SealError> {
        let mut body = self.envelope();
        body["document"] = document.clone();

        let response = self.action("insertOne", body).await?;
        info!(
            inserted_id = %response.get("insertedId").and_then(Value::as_str).unwrap_or("?"),
            "record inserted"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_modified_hash(
        &self,
        modified_hash: &str,
    ) -> Result<Option<Value>, SealError> {
        let mut body = self.envelope();
        body["filter"] = json!({"proof.modifiedHash": modified_hash});

        let response = self.action("findOne", body).await?;
        Ok(response
            .get("document")
            .filter(|d| !d.is_null())
            .cloned())
    }
}

/// In-process store used by tests and local dry runs.
///
/// Holds documents in memory with the same lookup semantics as the
/// production store.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Value>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, document: &Value) -> Result<(), SealError> {
        self.documents
            .write()
            .map_err(|_| SealError::Store {
                message: "memory store lock poisoned".to_string(),
            })?
            .push(document.clone());
        Ok(())
    }

    async fn find_by_modified_hash(
        &self,
        modified_hash: &str,
    ) -> Result<Option<Value>, SealError> {
        let documents = self.documents.read().map_err(|_| SealError::Store {
            message: "memory store lock poisoned".to_string(),
        })?;
        Ok(documents
            .iter()
            .find(|doc| {
                doc.pointer("/proof/modifiedHash").and_then(Value::as_str)
                    == Some(modified_hash)
            })
            .cloned())
    }
}
