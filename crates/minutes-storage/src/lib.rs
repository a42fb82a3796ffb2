//! Storage layer: SQLite persistence and artifact files.
//!
//! This crate provides database initialization, schema migrations,
//! repository types for meetings, transcript chunks, and training examples,
//! and filesystem storage for uploaded audio and generated visuals.

pub mod artifacts;
pub mod db;
pub mod migrations;
pub mod repository;

pub use artifacts::{sanitize_stem, ArtifactStore};
pub use db::Database;
pub use repository::{
    decode_embedding, encode_embedding, AnalyticsSummary, ChunkRepository, MeetingRepository,
    TrainingExampleRepository,
};
