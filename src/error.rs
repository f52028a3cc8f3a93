//! Error types for the story pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, StoryError>;

/// Errors that can occur anywhere in the generation and export pipeline.
#[derive(Error, Debug)]
pub enum StoryError {
    /// Missing or invalid configuration (e.g. no API credential).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The LLM endpoint answered with a non-success status.
    #[error("LLM request failed ({status}): {body}")]
    Transport { status: u16, body: String },

    /// The request never produced an HTTP response.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The endpoint answered successfully but without usable text.
    #[error("No content generated by the LLM")]
    EmptyCompletion,

    /// Outline text had no recoverable chapter structure.
    #[error("Failed to parse chapters from the generated outline: {0}")]
    Parse(String),

    /// Durable storage could not be read or written.
    #[error("Failed to persist story at '{path}': {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted record exists but is not a valid story.
    #[error("Story file '{path}' is corrupt: {reason}")]
    Corruption { path: PathBuf, reason: String },

    /// The requested story or chapter does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The story has no chapters to export.
    #[error("Story has no chapters")]
    EmptyStory,

    /// A chapter index past the end of the story.
    #[error("Chapter index {index} is out of range (story has {len} chapters)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A caller-supplied argument violated a precondition.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Rendering an export format failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl StoryError {
    /// Create a persistence error with path context.
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Create a corruption error with path context.
    pub fn corruption(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Corruption {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for StoryError {
    fn from(err: reqwest::Error) -> Self {
        StoryError::Http(err.to_string())
    }
}

impl From<zip::result::ZipError> for StoryError {
    fn from(err: zip::result::ZipError) -> Self {
        StoryError::Export(err.to_string())
    }
}
