/*!
 * Error types for the deepsub application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to the DeepL document API
#[derive(Error, Debug)]
pub enum DeepLError {
    /// Error when sending a request fails before the service answers
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when decoding a service response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Document upload rejected by the service
    #[error("Document submission rejected ({status}): {message}")]
    SubmissionFailed {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// The service rejected the document because it exceeds the per-request
    /// size limit. Distinguished so callers can switch to the chunked path.
    #[error("Document exceeds the DeepL size limit: {message}")]
    SizeLimitExceeded {
        /// Error message from the service
        message: String,
    },
}

/// Errors that can occur while parsing or serializing SRT documents
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The document does not parse into well-formed SRT entries
    #[error("Malformed SRT document at block starting line {line}: {reason}")]
    MalformedDocument {
        /// 1-based line number of the offending block
        line: usize,
        /// What was wrong with the block
        reason: String,
    },

    /// The document contains no entries at all
    #[error("SRT document contains no subtitle entries")]
    EmptyDocument,
}

/// Errors that can occur during document translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the DeepL API
    #[error("DeepL error: {0}")]
    Api(#[from] DeepLError),

    /// Error with subtitle parsing or serialization
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// The translation job reached the terminal `error` status
    #[error("{message}")]
    JobFailed {
        /// Message reported by the service, or a generic fallback
        message: String,
    },

    /// The status poll loop ran out of attempts before the job finished
    #[error("Translation job did not finish after {attempts} status polls")]
    PollTimeout {
        /// Number of polls performed
        attempts: u32,
    },

    /// A chunk of a large document failed; all temporaries were cleaned up
    /// before this was raised
    #[error("Failed to translate part {index} of the document: {source}")]
    ChunkFailed {
        /// 0-based index of the failing chunk
        index: usize,
        /// The underlying failure
        #[source]
        source: Box<TranslationError>,
    },

    /// A file operation in the pipeline failed
    #[error("File error for {path}: {message}")]
    File {
        /// Path involved in the failed operation
        path: String,
        /// Underlying I/O message
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the DeepL API
    #[error("DeepL error: {0}")]
    DeepL(#[from] DeepLError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl TranslationError {
    /// Whether this error (or, for chunk failures, its root cause) is the
    /// service's size-limit rejection.
    pub fn is_size_limit(&self) -> bool {
        match self {
            Self::Api(DeepLError::SizeLimitExceeded { .. }) => true,
            Self::ChunkFailed { source, .. } => source.is_size_limit(),
            _ => false,
        }
    }
}
