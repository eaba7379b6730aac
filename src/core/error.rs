//! Archiver error types.

use thiserror::Error;

/// Errors surfaced by the writer and coordinator layers.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("non-ASCII value in MHTML {field} header: {value:?}")]
    Encoding { field: &'static str, value: String },

    #[error("io error writing `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn encoding(field: &'static str, value: impl Into<String>) -> Self {
        Self::Encoding {
            field,
            value: value.into(),
        }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
