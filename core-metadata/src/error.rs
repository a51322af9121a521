use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("No usable fragments: {empty} of {total} were empty")]
    NoUsableFragments { total: usize, empty: usize },

    #[error("Invalid date string: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
