//! Error handling for Nocturne
//!
//! Every error surfaced to a caller must be enough to tell "your input is
//! invalid" apart from "the system failed while processing valid input";
//! see [`NocturneError::is_user_error`].

use thiserror::Error;

/// Result type alias for Nocturne operations
pub type Result<T> = std::result::Result<T, NocturneError>;

/// Main error type for Nocturne operations
#[derive(Error, Debug)]
pub enum NocturneError {
    // Planner errors: deterministic functions of the input, never retried
    #[error("unknown preset '{name}': preset must be one of: sleep, focus, raw")]
    InvalidPreset { name: String },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    // Request-boundary validation
    #[error("url must start with http:// or https://")]
    InvalidUrl,

    // Executor errors
    #[error("missing dependency: {binary}. Install it and ensure it's on PATH.")]
    MissingDependency { binary: String },

    #[error("download failed: {reason}")]
    Transport { reason: String },

    #[error("audio processing failed: {reason}")]
    Processing { reason: String },

    // Artifact store
    #[error("job not found: {job_id}")]
    JobNotFound { job_id: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NocturneError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            NocturneError::InvalidPreset { .. } => "INVALID_PRESET",
            NocturneError::InvalidParameter { .. } => "INVALID_PARAMETER",
            NocturneError::InvalidUrl => "INVALID_URL",
            NocturneError::MissingDependency { .. } => "MISSING_DEPENDENCY",
            NocturneError::Transport { .. } => "TRANSPORT_ERROR",
            NocturneError::Processing { .. } => "PROCESSING_ERROR",
            NocturneError::JobNotFound { .. } => "JOB_NOT_FOUND",
            NocturneError::Io(_) => "IO_ERROR",
            NocturneError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether this error describes bad caller input rather than a system
    /// failure. User errors are correctable by changing the request and
    /// retrying; system failures are not.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            NocturneError::InvalidPreset { .. }
                | NocturneError::InvalidParameter { .. }
                | NocturneError::InvalidUrl
                | NocturneError::JobNotFound { .. }
        )
    }
}
