//! Error taxonomy of the library.
//!
//! Errors raised by collaborators (file system, JSON,
//! bincode, image decoders) are wrapped unchanged; the
//! remaining variants cover preconditions the crate checks
//! itself.
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A source file is missing or could not be parsed.
    #[error("could not load `{path}`: {message}")]
    DataLoad { path: PathBuf, message: String },

    /// An operation was invoked before the setup it
    /// depends on (typically output paths).
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The streams can not be aligned: empty timestamp
    /// sequences, mismatched shapes or bad indices.
    #[error("alignment impossible: {0}")]
    AlignmentImpossible(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn data_load(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Error::DataLoad {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Error::NotConfigured(message.into())
    }

    pub fn alignment(message: impl Into<String>) -> Self {
        Error::AlignmentImpossible(message.into())
    }
}
