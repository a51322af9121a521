use core_sync::SyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvenioError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error during {context}: status {status} (expected {expected}): {message}")]
    Api {
        status: u16,
        expected: u16,
        context: String,
        message: String,
    },

    #[error("Malformed response during {context}: {message}")]
    Malformed { context: String, message: String },

    #[error("Cannot read file {path}: {message}")]
    File { path: String, message: String },

    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

impl From<InvenioError> for SyncError {
    fn from(error: InvenioError) -> Self {
        match error {
            InvenioError::Http(e) => SyncError::Transport(e.to_string()),
            InvenioError::Api {
                status,
                expected,
                context,
                message,
            } => {
                // Client-side rejections of a metadata document are
                // validation failures; everything else is an unexpected
                // status for the step.
                if (400..500).contains(&status) && context.contains("metadata") {
                    SyncError::Validation { status, message }
                } else {
                    SyncError::UnexpectedStatus {
                        status,
                        expected,
                        context,
                    }
                }
            }
            InvenioError::Malformed { context, message } => {
                SyncError::Transport(format!("malformed response during {context}: {message}"))
            }
            InvenioError::File { path, message } => {
                SyncError::Extraction(format!("cannot read file {path}: {message}"))
            }
            InvenioError::Configuration(message) => SyncError::Transport(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, InvenioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_rejection_maps_to_validation() {
        let error = InvenioError::Api {
            status: 400,
            expected: 200,
            context: "update draft metadata".to_string(),
            message: "creators required".to_string(),
        };
        assert!(matches!(
            SyncError::from(error),
            SyncError::Validation { status: 400, .. }
        ));
    }

    #[test]
    fn test_server_error_maps_to_unexpected_status() {
        let error = InvenioError::Api {
            status: 503,
            expected: 201,
            context: "create draft with metadata".to_string(),
            message: String::new(),
        };
        assert!(matches!(
            SyncError::from(error),
            SyncError::UnexpectedStatus { status: 503, expected: 201, .. }
        ));
    }
}
