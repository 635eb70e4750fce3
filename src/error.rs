use std::path::PathBuf;

use crate::BoxError;

/// Errors raised while rendering a voice-line catalog.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("Reference audio {path} is unusable: {reason}")]
    MissingInput { path: PathBuf, reason: String },
    #[error("Speaker embedding failed: {0}")]
    SpeakerEmbedding(#[source] BoxError),
    #[error("Synthesis failed for {text:?}: {source}")]
    Synthesis {
        text: String,
        #[source]
        source: BoxError,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("Invalid voice-line catalog: {0}")]
    Catalog(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
