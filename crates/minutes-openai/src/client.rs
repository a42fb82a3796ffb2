//! HTTP client for OpenAI-compatible APIs.
//!
//! One client covers the four endpoints the pipeline uses: audio
//! transcription (multipart), chat completions (plain and tool-calling),
//! embeddings, and image generation. Every request carries the configured
//! timeout; any non-success status maps to `MinutesError::UpstreamService`
//! with the status and body text.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use minutes_core::config::OpenAiConfig;
use minutes_core::error::MinutesError;

use crate::capability::{
    EmbeddingService, ImageService, LanguageService, ToolInvocation, ToolSpec, Transcription,
    TranscriptionService,
};

const CHAT_TEMPERATURE: f32 = 0.3;
const IMAGE_SIZE: &str = "1024x1024";

/// Client for an OpenAI-compatible API.
///
/// Cloning is cheap; the inner `reqwest::Client` is reference-counted, so one
/// configured instance can back several boxed service handles.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    chat_model: String,
    transcription_model: String,
    embedding_model: String,
    image_model: String,
    embedding_dim: usize,
}

impl OpenAiClient {
    /// Build a client from config plus the API key and the corpus embedding
    /// dimension.
    pub fn new(
        config: &OpenAiConfig,
        api_key: impl Into<String>,
        embedding_dim: usize,
    ) -> Result<Self, MinutesError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(MinutesError::Config(
                "OpenAI API key is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MinutesError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            chat_model: config.chat_model.clone(),
            transcription_model: config.transcription_model.clone(),
            embedding_model: config.embedding_model.clone(),
            image_model: config.image_model.clone(),
            embedding_dim,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn post_chat(&self, request: &ChatRequest<'_>) -> Result<ChatMessageOut, MinutesError> {
        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| MinutesError::UpstreamService(format!("Chat request failed: {}", e)))?;

        let response = check_status("Chat", response).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| MinutesError::UpstreamService(format!("Chat response parse: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| {
                MinutesError::UpstreamService("Chat response contained no choices".to_string())
            })
    }
}

impl TranscriptionService for OpenAiClient {
    async fn transcribe(
        &self,
        audio: &[u8],
        file_name: &str,
    ) -> Result<Transcription, MinutesError> {
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))
            .map_err(|e| MinutesError::UpstreamService(format!("Audio part: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.transcription_model.clone())
            .text("response_format", "verbose_json");

        let response = self
            .client
            .post(self.endpoint("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                MinutesError::UpstreamService(format!("Transcription request failed: {}", e))
            })?;

        let response = check_status("Transcription", response).await?;
        let parsed: TranscriptionResponse = response.json().await.map_err(|e| {
            MinutesError::UpstreamService(format!("Transcription response parse: {}", e))
        })?;

        debug!(
            chars = parsed.text.len(),
            duration = parsed.duration.unwrap_or(0.0),
            "Transcription complete"
        );
        Ok(Transcription {
            text: parsed.text,
            duration_secs: parsed.duration.unwrap_or(0.0),
        })
    }
}

impl LanguageService for OpenAiClient {
    async fn call_tools(
        &self,
        instructions: &str,
        input: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<ToolInvocation>, MinutesError> {
        let payload: Vec<ToolPayload<'_>> = tools
            .iter()
            .map(|tool| ToolPayload {
                kind: "function",
                function: FunctionPayload {
                    name: &tool.name,
                    description: &tool.description,
                    parameters: &tool.parameters,
                },
            })
            .collect();
        let request = ChatRequest {
            model: &self.chat_model,
            messages: [
                ChatMessageIn {
                    role: "system",
                    content: instructions,
                },
                ChatMessageIn {
                    role: "user",
                    content: input,
                },
            ],
            temperature: CHAT_TEMPERATURE,
            tools: (!payload.is_empty()).then_some(payload),
            tool_choice: (!tools.is_empty()).then_some("auto"),
        };

        let message = self.post_chat(&request).await?;
        let invocations = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolInvocation {
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();
        Ok(invocations)
    }

    async fn complete(&self, instructions: &str, input: &str) -> Result<String, MinutesError> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: [
                ChatMessageIn {
                    role: "system",
                    content: instructions,
                },
                ChatMessageIn {
                    role: "user",
                    content: input,
                },
            ],
            temperature: CHAT_TEMPERATURE,
            tools: None,
            tool_choice: None,
        };

        let message = self.post_chat(&request).await?;
        Ok(message.content.unwrap_or_default())
    }
}

impl EmbeddingService for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MinutesError> {
        if text.is_empty() {
            return Err(MinutesError::Validation(
                "Cannot embed empty text".to_string(),
            ));
        }

        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: [text],
        };
        let response = self
            .client
            .post(self.endpoint("embeddings"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                MinutesError::UpstreamService(format!("Embedding request failed: {}", e))
            })?;

        let response = check_status("Embedding", response).await?;
        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            MinutesError::UpstreamService(format!("Embedding response parse: {}", e))
        })?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|datum| datum.embedding)
            .ok_or_else(|| {
                MinutesError::UpstreamService("Embedding response contained no data".to_string())
            })
    }

    fn dimensions(&self) -> usize {
        self.embedding_dim
    }
}

impl ImageService for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, MinutesError> {
        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
        };
        let response = self
            .client
            .post(self.endpoint("images/generations"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MinutesError::UpstreamService(format!("Image request failed: {}", e)))?;

        let response = check_status("Image", response).await?;
        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| MinutesError::UpstreamService(format!("Image response parse: {}", e)))?;

        let url = parsed
            .data
            .into_iter()
            .next()
            .map(|datum| datum.url)
            .ok_or_else(|| {
                MinutesError::UpstreamService("Image response contained no data".to_string())
            })?;

        // The returned URL is pre-signed; no auth header on the fetch.
        let image = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MinutesError::UpstreamService(format!("Image fetch failed: {}", e)))?;
        let image = check_status("Image fetch", image).await?;
        let bytes = image
            .bytes()
            .await
            .map_err(|e| MinutesError::UpstreamService(format!("Image body: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

async fn check_status(
    operation: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, MinutesError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MinutesError::UpstreamService(format!(
        "{} API error {}: {}",
        operation, status, body
    )))
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or_default();
    match ext.to_ascii_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessageIn<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolPayload<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
}

#[derive(Serialize)]
struct ChatMessageIn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ToolPayload<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    function: FunctionPayload<'a>,
}

#[derive(Serialize)]
struct FunctionPayload<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Deserialize)]
struct ChatMessageOut {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallOut>>,
}

#[derive(Deserialize)]
struct ToolCallOut {
    function: FunctionCallOut,
}

#[derive(Deserialize)]
struct FunctionCallOut {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
    #[serde(default)]
    duration: Option<f64>,
}
