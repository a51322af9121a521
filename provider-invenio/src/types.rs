//! Response types for the InvenioRDM records API.

use serde::Deserialize;
use serde_json::Value;

/// Body of draft- and version-creating responses. Only the id is consumed;
/// file upload endpoints are re-derived per file from the initiate call.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftResponse {
    pub id: String,
}

/// Body of the file-initiate response: one entry per registered key.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntriesResponse {
    pub entries: Vec<FileEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    pub key: String,
    pub links: FileLinks,
}

/// Per-file upload endpoints issued by the initiate call.
#[derive(Debug, Clone, Deserialize)]
pub struct FileLinks {
    pub content: String,
    pub commit: String,
}

/// Body of `GET /records/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordResponse {
    pub id: String,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub links: RecordLinks,
}

/// Landing-page links of a record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordLinks {
    #[serde(default)]
    pub self_html: Option<String>,
    #[serde(default)]
    pub parent_html: Option<String>,
}
