//! Service traits for the upstream model capabilities.
//!
//! Four seams cover everything the pipeline needs from a model provider:
//! transcription, chat (plain and tool-calling), embeddings, and image
//! generation. `OpenAiClient` implements all of them against the OpenAI API;
//! the mocks in [`crate::mock`] implement them for tests.
//!
//! Each trait has an object-safe `Dyn*` twin with boxed futures plus a
//! blanket impl, so callers can hold `Box<dyn Dyn*Service>` without generics.

use minutes_core::error::MinutesError;

/// Result of transcribing one audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub text: String,
    /// Audio length reported by the transcription service. 0.0 when the
    /// service did not report one.
    pub duration_secs: f64,
}

/// A function tool offered to the chat model, as a JSON Schema.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// One tool call the model chose to make, with its raw JSON arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: String,
}

// ---------------------------------------------------------------------------
// Transcription
// ---------------------------------------------------------------------------

/// Service for converting recorded audio into text.
pub trait TranscriptionService: Send + Sync {
    /// Transcribe a complete audio file. The file name carries the container
    /// extension the service uses to pick a decoder.
    fn transcribe(
        &self,
        audio: &[u8],
        file_name: &str,
    ) -> impl std::future::Future<Output = Result<Transcription, MinutesError>> + Send;
}

/// Object-safe version of [`TranscriptionService`] for dynamic dispatch.
pub trait DynTranscriptionService: Send + Sync {
    fn transcribe_boxed<'a>(
        &'a self,
        audio: &'a [u8],
        file_name: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Transcription, MinutesError>> + Send + 'a>,
    >;
}

impl<T: TranscriptionService> DynTranscriptionService for T {
    fn transcribe_boxed<'a>(
        &'a self,
        audio: &'a [u8],
        file_name: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Transcription, MinutesError>> + Send + 'a>,
    > {
        Box::pin(self.transcribe(audio, file_name))
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Service for chat completions, plain or offered a set of function tools.
pub trait LanguageService: Send + Sync {
    /// Offer `tools` to the model and collect every call it makes, in the
    /// order returned. An empty vec means the model answered without
    /// invoking any tool.
    fn call_tools(
        &self,
        instructions: &str,
        input: &str,
        tools: &[ToolSpec],
    ) -> impl std::future::Future<Output = Result<Vec<ToolInvocation>, MinutesError>> + Send;

    /// Plain chat completion returning the assistant message text.
    fn complete(
        &self,
        instructions: &str,
        input: &str,
    ) -> impl std::future::Future<Output = Result<String, MinutesError>> + Send;
}

/// Object-safe version of [`LanguageService`] for dynamic dispatch.
pub trait DynLanguageService: Send + Sync {
    fn call_tools_boxed<'a>(
        &'a self,
        instructions: &'a str,
        input: &'a str,
        tools: &'a [ToolSpec],
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<Output = Result<Vec<ToolInvocation>, MinutesError>>
                + Send
                + 'a,
        >,
    >;

    fn complete_boxed<'a>(
        &'a self,
        instructions: &'a str,
        input: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, MinutesError>> + Send + 'a>,
    >;
}

impl<T: LanguageService> DynLanguageService for T {
    fn call_tools_boxed<'a>(
        &'a self,
        instructions: &'a str,
        input: &'a str,
        tools: &'a [ToolSpec],
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<Output = Result<Vec<ToolInvocation>, MinutesError>>
                + Send
                + 'a,
        >,
    > {
        Box::pin(self.call_tools(instructions, input, tools))
    }

    fn complete_boxed<'a>(
        &'a self,
        instructions: &'a str,
        input: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, MinutesError>> + Send + 'a>,
    > {
        Box::pin(self.complete(instructions, input))
    }
}

// ---------------------------------------------------------------------------
// Embeddings
// ---------------------------------------------------------------------------

/// Service for generating text embeddings.
///
/// Implementations convert text into fixed-dimensional vectors used for both
/// ingestion (chunk indexing) and search (query embedding).
pub trait EmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, MinutesError>> + Send;

    /// Return the dimensionality of vectors produced by this service.
    fn dimensions(&self) -> usize;
}

/// Object-safe version of [`EmbeddingService`] for dynamic dispatch.
pub trait DynEmbeddingService: Send + Sync {
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<f32>, MinutesError>> + Send + 'a>,
    >;

    fn dimensions(&self) -> usize;
}

impl<T: EmbeddingService> DynEmbeddingService for T {
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<f32>, MinutesError>> + Send + 'a>,
    > {
        Box::pin(self.embed(text))
    }

    fn dimensions(&self) -> usize {
        EmbeddingService::dimensions(self)
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Service for generating an image from a text prompt.
pub trait ImageService: Send + Sync {
    /// Generate an image and return its encoded bytes (PNG).
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, MinutesError>> + Send;
}

/// Object-safe version of [`ImageService`] for dynamic dispatch.
pub trait DynImageService: Send + Sync {
    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<u8>, MinutesError>> + Send + 'a>,
    >;
}

impl<T: ImageService> DynImageService for T {
    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<u8>, MinutesError>> + Send + 'a>,
    > {
        Box::pin(self.generate(prompt))
    }
}
