use thiserror::Error;

/// Top-level error type for the Minutes system.
///
/// Each variant corresponds to one failure class in the processing pipeline.
/// Subsystem crates return this type directly so that the `?` operator works
/// seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MinutesError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or missing input. The pipeline or search never starts.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external capability call (transcription, extraction, summarization,
    /// embedding) failed. Timeouts land here too.
    #[error("Upstream service error: {0}")]
    UpstreamService(String),

    /// A store operation failed. Prior successful writes in the same
    /// pipeline run are not rolled back.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MinutesError {
    fn from(err: toml::de::Error) -> Self {
        MinutesError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MinutesError {
    fn from(err: toml::ser::Error) -> Self {
        MinutesError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MinutesError {
    fn from(err: serde_json::Error) -> Self {
        MinutesError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Minutes operations.
pub type Result<T> = std::result::Result<T, MinutesError>;
