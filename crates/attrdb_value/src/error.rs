//! Error types for the value crate.

use thiserror::Error;

/// Result type for value and codec operations.
pub type ValueResult<T> = Result<T, ValueError>;

/// Errors that can occur while encoding or decoding attribute documents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The input was not valid JSON.
    #[error("invalid JSON: {message}")]
    InvalidJson {
        /// Description of the parse error.
        message: String,
    },

    /// The top level of a document must be a JSON object.
    #[error("attribute document must be a JSON object, found {found}")]
    NonObjectDocument {
        /// Shape of the value that was found instead.
        found: String,
    },

    /// Failed to encode a document to JSON.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },
}

impl ValueError {
    /// Create an invalid JSON error.
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::InvalidJson {
            message: message.into(),
        }
    }

    /// Create a non-object document error.
    pub fn non_object_document(found: impl Into<String>) -> Self {
        Self::NonObjectDocument {
            found: found.into(),
        }
    }

    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }
}
