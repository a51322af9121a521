//! InvenioRDM API client implementation
//!
//! Implements the `RepositoryClient` trait against the records API of an
//! InvenioRDM deployment.

use crate::error::InvenioError;
use crate::types::{DraftResponse, FileEntriesResponse, RecordResponse};
use async_trait::async_trait;
use core_sync::{DraftHandle, FileSlot, RepositoryClient};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument};

/// Client configuration: API root, bearer token and per-request timeout.
#[derive(Debug, Clone)]
pub struct InvenioConfig {
    /// API root, e.g. `https://test.researchdata.example.org/api`
    pub api_url: String,
    pub token: String,
    pub request_timeout: Duration,
}

impl InvenioConfig {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: token.into(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Landing-page URLs of a record, for publishing URL listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUrls {
    pub self_html: Option<String>,
    pub parent_html: Option<String>,
}

/// InvenioRDM records API client.
pub struct InvenioClient {
    http: reqwest::Client,
    api_url: String,
}

impl InvenioClient {
    /// Build a client with default JSON and bearer-auth headers.
    ///
    /// # Errors
    ///
    /// Fails when the token contains characters that cannot form a header
    /// value, or the underlying HTTP client cannot be constructed.
    pub fn new(config: InvenioConfig) -> Result<Self, InvenioError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| InvenioError::Configuration(format!("invalid token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn records_url(&self, suffix: &str) -> String {
        format!("{}/records{}", self.api_url, suffix)
    }

    /// Check the response against the expected status, capturing the body
    /// text of a mismatch for diagnostics.
    async fn expect_status(
        response: Response,
        expected: StatusCode,
        context: &str,
    ) -> Result<Response, InvenioError> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(InvenioError::Api {
            status: status.as_u16(),
            expected: expected.as_u16(),
            context: context.to_string(),
            message,
        })
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T, InvenioError> {
        response
            .json::<T>()
            .await
            .map_err(|e| InvenioError::Malformed {
                context: context.to_string(),
                message: e.to_string(),
            })
    }

    /// Landing-page links of a record (`self_html`, `parent_html`).
    #[instrument(skip(self))]
    pub async fn record_urls(&self, record_id: &str) -> Result<RecordUrls, InvenioError> {
        let response = self
            .http
            .get(self.records_url(&format!("/{record_id}")))
            .send()
            .await?;
        let response = Self::expect_status(response, StatusCode::OK, "fetch record urls").await?;
        let record: RecordResponse = Self::parse_json(response, "fetch record urls").await?;
        Ok(RecordUrls {
            self_html: record.links.self_html,
            parent_html: record.links.parent_html,
        })
    }

    /// Resolve a community slug to its id (`GET /communities/{slug}`).
    #[instrument(skip(self))]
    pub async fn community_id(&self, slug: &str) -> Result<String, InvenioError> {
        let response = self
            .http
            .get(format!("{}/communities/{slug}", self.api_url))
            .send()
            .await?;
        let response = Self::expect_status(response, StatusCode::OK, "resolve community").await?;
        let body: Value = Self::parse_json(response, "resolve community").await?;
        body["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| InvenioError::Malformed {
                context: "resolve community".to_string(),
                message: "response carries no id".to_string(),
            })
    }
}

#[async_trait]
impl RepositoryClient for InvenioClient {
    #[instrument(skip(self, metadata))]
    async fn create_draft(&self, metadata: &Value) -> core_sync::Result<DraftHandle> {
        let context = "create draft with metadata";
        let response = self
            .http
            .post(self.records_url(""))
            .json(metadata)
            .send()
            .await
            .map_err(InvenioError::from)?;
        let response = Self::expect_status(response, StatusCode::CREATED, context).await?;
        let draft: DraftResponse = Self::parse_json(response, context).await?;
        debug!(record_id = %draft.id, "Draft created");
        Ok(DraftHandle {
            record_id: draft.id,
        })
    }

    #[instrument(skip(self))]
    async fn create_version(&self, record_id: &str) -> core_sync::Result<DraftHandle> {
        let context = "create version";
        let response = self
            .http
            .post(self.records_url(&format!("/{record_id}/versions")))
            .send()
            .await
            .map_err(InvenioError::from)?;
        let response = Self::expect_status(response, StatusCode::CREATED, context).await?;
        let draft: DraftResponse = Self::parse_json(response, context).await?;
        debug!(record_id = %draft.id, "Version draft created");
        Ok(DraftHandle {
            record_id: draft.id,
        })
    }

    #[instrument(skip(self, metadata))]
    async fn update_draft_metadata(
        &self,
        record_id: &str,
        metadata: &Value,
    ) -> core_sync::Result<()> {
        let response = self
            .http
            .put(self.records_url(&format!("/{record_id}/draft")))
            .json(metadata)
            .send()
            .await
            .map_err(InvenioError::from)?;
        Self::expect_status(response, StatusCode::OK, "update draft metadata").await?;
        Ok(())
    }

    #[instrument(skip(self, filenames), fields(files = filenames.len()))]
    async fn initiate_files(
        &self,
        record_id: &str,
        filenames: &[String],
    ) -> core_sync::Result<Vec<FileSlot>> {
        let context = "initiate files";
        let entries: Vec<Value> = filenames.iter().map(|key| json!({"key": key})).collect();
        let response = self
            .http
            .post(self.records_url(&format!("/{record_id}/draft/files")))
            .json(&entries)
            .send()
            .await
            .map_err(InvenioError::from)?;
        let response = Self::expect_status(response, StatusCode::CREATED, context).await?;
        let body: FileEntriesResponse = Self::parse_json(response, context).await?;
        Ok(body
            .entries
            .into_iter()
            .map(|entry| FileSlot {
                key: entry.key,
                content_url: entry.links.content,
                commit_url: entry.links.commit,
            })
            .collect())
    }

    #[instrument(skip(self, slot), fields(key = %slot.key))]
    async fn upload_file_content(&self, slot: &FileSlot, path: &Path) -> core_sync::Result<()> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| InvenioError::File {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let response = self
            .http
            .put(&slot.content_url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(InvenioError::from)?;
        Self::expect_status(response, StatusCode::OK, "upload file content").await?;
        Ok(())
    }

    #[instrument(skip(self, slot), fields(key = %slot.key))]
    async fn commit_file(&self, slot: &FileSlot) -> core_sync::Result<()> {
        let response = self
            .http
            .post(&slot.commit_url)
            .send()
            .await
            .map_err(InvenioError::from)?;
        Self::expect_status(response, StatusCode::OK, "commit file").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_draft_files(&self, record_id: &str) -> core_sync::Result<()> {
        let response = self
            .http
            .delete(self.records_url(&format!("/{record_id}/draft/files")))
            .send()
            .await
            .map_err(InvenioError::from)?;
        // A draft with no files answers 404; both count as cleared.
        let status = response.status();
        if status == StatusCode::NO_CONTENT
            || status == StatusCode::OK
            || status == StatusCode::NOT_FOUND
        {
            return Ok(());
        }
        Self::expect_status(response, StatusCode::NO_CONTENT, "delete draft files").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn submit_to_community(
        &self,
        record_id: &str,
        community_id: &str,
    ) -> core_sync::Result<()> {
        let body = json!({
            "receiver": {"community": community_id},
            "type": "community-submission",
        });
        let response = self
            .http
            .put(self.records_url(&format!("/{record_id}/draft/review")))
            .json(&body)
            .send()
            .await
            .map_err(InvenioError::from)?;
        Self::expect_status(response, StatusCode::OK, "submit to community").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn request_curation(&self, record_id: &str) -> core_sync::Result<()> {
        let body = json!({"topic": {"record": record_id}});
        let response = self
            .http
            .post(format!("{}/curations", self.api_url))
            .json(&body)
            .send()
            .await
            .map_err(InvenioError::from)?;
        Self::expect_status(response, StatusCode::CREATED, "request curation").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn submit_review(&self, record_id: &str) -> core_sync::Result<()> {
        let response = self
            .http
            .post(self.records_url(&format!("/{record_id}/draft/actions/submit-review")))
            .send()
            .await
            .map_err(InvenioError::from)?;
        // Review submission is accepted asynchronously.
        Self::expect_status(response, StatusCode::ACCEPTED, "submit review").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_record_metadata(&self, record_id: &str) -> core_sync::Result<Value> {
        let context = "fetch record metadata";
        let response = self
            .http
            .get(self.records_url(&format!("/{record_id}")))
            .send()
            .await
            .map_err(InvenioError::from)?;
        let response = Self::expect_status(response, StatusCode::OK, context).await?;
        let record: RecordResponse = Self::parse_json(response, context).await?;
        Ok(record.metadata)
    }
}
