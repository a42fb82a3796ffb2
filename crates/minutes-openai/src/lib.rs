//! OpenAI-compatible capability clients.
//!
//! This crate defines the service traits the pipeline depends on
//! (transcription, chat, embeddings, image generation), the production
//! `OpenAiClient` that implements them over HTTP, and deterministic mocks
//! for tests.

pub mod capability;
pub mod client;
pub mod mock;

pub use capability::{
    DynEmbeddingService, DynImageService, DynLanguageService, DynTranscriptionService,
    EmbeddingService, ImageService, LanguageService, ToolInvocation, ToolSpec, Transcription,
    TranscriptionService,
};
pub use client::OpenAiClient;
pub use mock::{MockEmbedding, MockImage, MockLanguage, MockTranscription};
