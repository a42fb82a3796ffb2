use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MinutesError, Result};

/// Top-level configuration for the Minutes application.
///
/// Loaded from `~/.minutes/config.toml` by default. Each section corresponds
/// to a bounded context or cross-cutting concern. The OpenAI API key is never
/// stored here; it is read from the `OPENAI_API_KEY` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinutesConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl Default for MinutesConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            openai: OpenAiConfig::default(),
            analysis: AnalysisConfig::default(),
            index: IndexConfig::default(),
            search: SearchConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl MinutesConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MinutesConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MinutesError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for SQLite, uploaded audio, and generated visuals.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Port the HTTP API listens on.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.minutes/data".to_string(),
            log_level: "info".to_string(),
            port: 8080,
        }
    }
}

/// OpenAI-compatible API settings shared by all capability calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Base URL of an OpenAI-compatible API, without trailing slash.
    pub api_base: String,
    /// Chat model used for extraction and summarization.
    pub chat_model: String,
    /// Transcription model.
    pub transcription_model: String,
    /// Embedding model.
    pub embedding_model: String,
    /// Image generation model.
    pub image_model: String,
    /// Per-request timeout in seconds. A timeout is an upstream failure.
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-4o".to_string(),
            transcription_model: "whisper-1".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            image_model: "dall-e-3".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Content analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum characters of transcript sent to the extraction and
    /// summarization calls. One rule for both; cut on a char boundary.
    pub max_input_chars: usize,
    /// Maximum characters of summary used to build the visual prompt.
    pub visual_prompt_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 12_000,
            visual_prompt_chars: 500,
        }
    }
}

/// Chunking and embedding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Chunk size in characters.
    pub chunk_size: usize,
    /// Corpus-wide embedding dimension. A vector of any other length is
    /// rejected before it reaches the store.
    pub embedding_dim: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            embedding_dim: 1536,
        }
    }
}

/// Search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default number of results returned per query.
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { top_k: 10 }
    }
}

/// Upload validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Accepted audio file extensions (lowercase, no dot).
    pub allowed_extensions: Vec<String>,
    /// Maximum upload size in megabytes.
    pub max_upload_mb: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![
                "mp3".to_string(),
                "wav".to_string(),
                "m4a".to_string(),
            ],
            max_upload_mb: 100,
        }
    }
}
