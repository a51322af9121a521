use core_metadata::MetadataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// A fragment or snapshot could not be produced for the entity
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The remote rejected the metadata shape
    #[error("Metadata rejected by remote (status {status}): {message}")]
    Validation { status: u16, message: String },

    /// Network failure or timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response code outside the expected success set for a step
    #[error("Unexpected status {status} (expected {expected}) during {context}")]
    UnexpectedStatus {
        status: u16,
        expected: u16,
        context: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Invalid sync step: {0}")]
    InvalidStep(String),

    #[error("Invalid sync action: {0}")]
    InvalidAction(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
