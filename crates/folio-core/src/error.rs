//! Error types for `folio-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`.

/// Unified error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No record with the given id exists in the collection.
    #[error("{collection} record not found: {id}")]
    NotFound { collection: String, id: String },

    /// A document failed its validation rules.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A stored record or snapshot could not be (de)serialised.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing the snapshot file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `folio-core`.
pub type CoreResult<T> = Result<T, CoreError>;
