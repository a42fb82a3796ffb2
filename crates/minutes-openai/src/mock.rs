//! Deterministic mock services for testing.
//!
//! These live in the library (not behind `cfg(test)`) so downstream crates
//! can drive the pipeline and search engine without network access. Outputs
//! are derived from input hashes, so identical inputs always produce
//! identical results.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use minutes_core::error::MinutesError;

use crate::capability::{
    EmbeddingService, ImageService, LanguageService, ToolInvocation, ToolSpec, Transcription,
    TranscriptionService,
};

/// Mock transcription returning a fixed transcript and duration.
#[derive(Debug, Clone)]
pub struct MockTranscription {
    text: String,
    duration_secs: f64,
    fail: bool,
}

impl MockTranscription {
    pub fn new(text: impl Into<String>, duration_secs: f64) -> Self {
        Self {
            text: text.into(),
            duration_secs,
            fail: false,
        }
    }

    /// A transcription service whose every call fails.
    pub fn failing() -> Self {
        Self {
            text: String::new(),
            duration_secs: 0.0,
            fail: true,
        }
    }
}

impl TranscriptionService for MockTranscription {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _file_name: &str,
    ) -> Result<Transcription, MinutesError> {
        if self.fail {
            return Err(MinutesError::UpstreamService(
                "Mock transcription failure".to_string(),
            ));
        }
        Ok(Transcription {
            text: self.text.clone(),
            duration_secs: self.duration_secs,
        })
    }
}

/// Mock chat service with canned tool arguments and summary text.
///
/// `call_tools` answers with one invocation per offered tool that has a
/// configured argument string; tools with nothing configured are skipped,
/// which is how a model that declines to call them behaves.
#[derive(Debug, Clone, Default)]
pub struct MockLanguage {
    tool_arguments: HashMap<String, String>,
    summary: String,
    fail: bool,
}

impl MockLanguage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool_response(mut self, tool_name: &str, arguments: &str) -> Self {
        self.tool_arguments
            .insert(tool_name.to_string(), arguments.to_string());
        self
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    /// A chat service whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl LanguageService for MockLanguage {
    async fn call_tools(
        &self,
        _instructions: &str,
        _input: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<ToolInvocation>, MinutesError> {
        if self.fail {
            return Err(MinutesError::UpstreamService(
                "Mock chat failure".to_string(),
            ));
        }
        let invocations = tools
            .iter()
            .filter_map(|tool| {
                self.tool_arguments
                    .get(&tool.name)
                    .map(|arguments| ToolInvocation {
                        name: tool.name.clone(),
                        arguments: arguments.clone(),
                    })
            })
            .collect();
        Ok(invocations)
    }

    async fn complete(&self, _instructions: &str, _input: &str) -> Result<String, MinutesError> {
        if self.fail {
            return Err(MinutesError::UpstreamService(
                "Mock chat failure".to_string(),
            ));
        }
        Ok(self.summary.clone())
    }
}

/// Mock embedding service returning deterministic hash-based vectors.
///
/// Identical inputs always produce identical L2-normalized outputs.
/// `failing_after` makes every call past the first `n` fail, which exercises
/// mid-batch indexing failures.
#[derive(Debug)]
pub struct MockEmbedding {
    dimensions: usize,
    fail_after: Option<usize>,
    calls: AtomicUsize,
}

impl MockEmbedding {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            fail_after: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeed for the first `n` calls, then fail every call after.
    pub fn failing_after(dimensions: usize, n: usize) -> Self {
        Self {
            dimensions,
            fail_after: Some(n),
            calls: AtomicUsize::new(0),
        }
    }

    fn hash_to_vector(&self, text: &str) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.dimensions);
        for i in 0..self.dimensions {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let h = hasher.finish();
            let val = ((h as f64) / (u64::MAX as f64)) * 2.0 - 1.0;
            result.push(val as f32);
        }

        // L2-normalize to unit vectors, matching the production service.
        let norm: f32 = result.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut result {
                *val /= norm;
            }
        }

        result
    }
}

impl EmbeddingService for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MinutesError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.fail_after {
            if call >= limit {
                return Err(MinutesError::UpstreamService(
                    "Mock embedding failure".to_string(),
                ));
            }
        }
        if text.is_empty() {
            return Err(MinutesError::Validation(
                "Cannot embed empty text".to_string(),
            ));
        }
        Ok(self.hash_to_vector(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Mock image service returning fixed PNG bytes.
#[derive(Debug, Clone)]
pub struct MockImage {
    bytes: Vec<u8>,
    fail: bool,
}

impl MockImage {
    pub fn new() -> Self {
        Self {
            bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
            fail: false,
        }
    }

    /// An image service whose every call fails.
    pub fn failing() -> Self {
        Self {
            bytes: Vec::new(),
            fail: true,
        }
    }
}

impl Default for MockImage {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageService for MockImage {
    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>, MinutesError> {
        if self.fail {
            return Err(MinutesError::UpstreamService(
                "Mock image failure".to_string(),
            ));
        }
        Ok(self.bytes.clone())
    }
}
