//! Remote repository client contract.
//!
//! The orchestrator only depends on this trait; provider crates implement it
//! against a concrete repository API. Every method is one remote call with
//! one expected success status; anything else surfaces as a [`SyncError`]
//! and fails the entity at the step that issued the call. Retries, if any,
//! belong to the transport implementation, not to this contract.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Handle to a draft record returned by draft- and version-creating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftHandle {
    pub record_id: String,
}

/// Upload slot issued by the file-initiate call: where to stream the content
/// of one file and where to commit it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSlot {
    /// File key (basename) the slot was initiated for
    pub key: String,
    pub content_url: String,
    pub commit_url: String,
}

/// Operations of the remote repository consumed by the sync orchestrator.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Create a new draft record from a deposit document.
    async fn create_draft(&self, metadata: &Value) -> Result<DraftHandle>;

    /// Open a new version draft of a published record.
    async fn create_version(&self, record_id: &str) -> Result<DraftHandle>;

    /// Replace the metadata of an existing draft.
    async fn update_draft_metadata(&self, record_id: &str, metadata: &Value) -> Result<()>;

    /// Register file keys on a draft and obtain one upload slot per key.
    async fn initiate_files(&self, record_id: &str, filenames: &[String]) -> Result<Vec<FileSlot>>;

    /// Stream one file's content into its upload slot.
    async fn upload_file_content(&self, slot: &FileSlot, path: &Path) -> Result<()>;

    /// Commit a previously uploaded file.
    async fn commit_file(&self, slot: &FileSlot) -> Result<()>;

    /// Remove all files from a draft (update path, before re-attaching).
    async fn delete_draft_files(&self, record_id: &str) -> Result<()>;

    /// Submit the draft to a community for inclusion.
    async fn submit_to_community(&self, record_id: &str, community_id: &str) -> Result<()>;

    /// Open a curation request for the record.
    async fn request_curation(&self, record_id: &str) -> Result<()>;

    /// Submit the draft for review. Accepted-asynchronously counts as
    /// success; final curator approval is not polled.
    async fn submit_review(&self, record_id: &str) -> Result<()>;

    /// Fetch the currently published metadata of a record (diff path).
    async fn fetch_record_metadata(&self, record_id: &str) -> Result<Value>;
}
