//! The meeting ingestion pipeline.
//!
//! One upload flows through transcription, content analysis, best-effort
//! visual synthesis, persistence, and chunk indexing, in that order. Failures
//! propagate immediately; nothing is retried.

pub mod pipeline;
pub mod stage;

pub use pipeline::{MeetingPipeline, UploadRequest};
pub use stage::PipelineStage;
