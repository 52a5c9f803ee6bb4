use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrookError {
    /// The underlying storage medium failed; fatal to the calling operation.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No item with the given identifier; recoverable, nothing was mutated.
    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    /// Illegal operation sequencing, e.g. nested batches.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Feed already exists: {0}")]
    FeedExists(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BrookError>;
