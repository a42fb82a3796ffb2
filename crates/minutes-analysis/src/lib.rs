//! Content analysis for meeting transcripts.
//!
//! Wraps the chat and image capabilities: structured extraction of action
//! items and decisions, summarization, best-effort visual synthesis, and
//! training-example derivation from stored meetings.

pub mod analyzer;
pub mod prompts;
pub mod training;
pub mod visual;

pub use analyzer::{ContentAnalyzer, MeetingAnalysis};
pub use training::build_training_examples;
pub use visual::{VisualArtifact, VisualSynthesizer};
