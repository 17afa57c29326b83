use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum Error {
    /// The maildir cannot be used as a message source.
    #[error("cannot open maildir {path:?}: {reason}")]
    Configuration { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A single message whose metadata could not be read.
#[derive(Debug, Error)]
#[error("could not fetch message {message_id}: {source}")]
pub struct FetchError {
    pub message_id: String,
    #[source]
    pub source: io::Error,
}

pub type Result<T> = std::result::Result<T, Error>;
