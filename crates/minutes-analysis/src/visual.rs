//! Best-effort visual summaries.

use tracing::{debug, warn};

use minutes_core::error::MinutesError;
use minutes_openai::{DynImageService, ImageService};
use minutes_storage::ArtifactStore;

use crate::prompts::{truncate_chars, visual_prompt};

/// Outcome of visual synthesis. Failure is a value, not an error; nothing
/// downstream depends on a visual existing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualArtifact {
    /// Relative path of the stored PNG.
    Stored(String),
    Unavailable,
}

impl VisualArtifact {
    pub fn path(&self) -> Option<&str> {
        match self {
            VisualArtifact::Stored(path) => Some(path),
            VisualArtifact::Unavailable => None,
        }
    }
}

/// Generates an infographic from a meeting summary and stores it.
///
/// The prompt is built from a fixed-length prefix of the summary. Generation,
/// fetch, and write failures all degrade to [`VisualArtifact::Unavailable`]
/// with a warning; they never fail the caller.
pub struct VisualSynthesizer {
    image: Box<dyn DynImageService>,
    artifacts: ArtifactStore,
    prompt_chars: usize,
}

impl VisualSynthesizer {
    pub fn new(
        image: impl ImageService + 'static,
        artifacts: ArtifactStore,
        prompt_chars: usize,
    ) -> Self {
        Self::new_dyn(Box::new(image), artifacts, prompt_chars)
    }

    pub fn new_dyn(
        image: Box<dyn DynImageService>,
        artifacts: ArtifactStore,
        prompt_chars: usize,
    ) -> Self {
        Self {
            image,
            artifacts,
            prompt_chars,
        }
    }

    /// Generate and store a visual for the summary. The title becomes part
    /// of the stored file name.
    pub async fn synthesize(&self, summary: &str, title: &str) -> VisualArtifact {
        match self.generate_and_store(summary, title).await {
            Ok(path) => {
                debug!(path = %path, "Visual summary stored");
                VisualArtifact::Stored(path)
            }
            Err(e) => {
                warn!(error = %e, "Visual synthesis failed, continuing without a visual");
                VisualArtifact::Unavailable
            }
        }
    }

    async fn generate_and_store(
        &self,
        summary: &str,
        title: &str,
    ) -> Result<String, MinutesError> {
        let prompt = visual_prompt(truncate_chars(summary, self.prompt_chars));
        let bytes = self.image.generate_boxed(&prompt).await?;
        self.artifacts.save_visual(title, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use minutes_openai::mock::MockImage;

    fn store(dir: &tempfile::TempDir) -> ArtifactStore {
        ArtifactStore::new(dir.path())
    }

    // ---- Success ----

    #[tokio::test]
    async fn test_synthesize_stores_png_under_visuals() {
        let dir = tempfile::tempdir().unwrap();
        let synthesizer = VisualSynthesizer::new(MockImage::new(), store(&dir), 500);

        let artifact = synthesizer.synthesize("A productive sync.", "Weekly Sync").await;
        let path = artifact.path().expect("visual should be stored");
        assert!(path.starts_with("visuals/"));
        assert!(path.ends_with("_Weekly_Sync.png"));

        let bytes = std::fs::read(store(&dir).resolve(path)).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    // ---- Failure degrades, never errors ----

    #[tokio::test]
    async fn test_synthesize_failure_returns_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let synthesizer = VisualSynthesizer::new(MockImage::failing(), store(&dir), 500);

        let artifact = synthesizer.synthesize("A summary.", "Standup").await;
        assert_eq!(artifact, VisualArtifact::Unavailable);
        assert!(artifact.path().is_none());

        // Nothing was written.
        assert!(!dir.path().join("visuals").exists());
    }

    #[tokio::test]
    async fn test_synthesize_unwritable_directory_returns_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the data dir should be makes every write fail.
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, b"x").unwrap();
        let synthesizer =
            VisualSynthesizer::new(MockImage::new(), ArtifactStore::new(&blocked), 500);

        let artifact = synthesizer.synthesize("A summary.", "Standup").await;
        assert_eq!(artifact, VisualArtifact::Unavailable);
    }

    // ---- Prompt construction ----

    struct CapturingImage {
        prompts: Mutex<Vec<String>>,
    }

    impl ImageService for CapturingImage {
        async fn generate(&self, prompt: &str) -> Result<Vec<u8>, MinutesError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(vec![0u8; 4])
        }
    }

    #[tokio::test]
    async fn test_synthesize_truncates_summary_in_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let image = std::sync::Arc::new(CapturingImage {
            prompts: Mutex::new(Vec::new()),
        });
        let synthesizer = VisualSynthesizer::new(
            SharedImage(image.clone()),
            store(&dir),
            8,
        );

        synthesizer.synthesize("abcdefghijklmnop", "t").await;

        let prompts = image.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("abcdefgh"));
        assert!(!prompts[0].contains("abcdefghi"));
    }

    struct SharedImage(std::sync::Arc<CapturingImage>);

    impl ImageService for SharedImage {
        async fn generate(&self, prompt: &str) -> Result<Vec<u8>, MinutesError> {
            self.0.generate(prompt).await
        }
    }

    // ---- Accessor ----

    #[test]
    fn test_path_accessor() {
        let stored = VisualArtifact::Stored("visuals/x.png".to_string());
        assert_eq!(stored.path(), Some("visuals/x.png"));
        assert_eq!(VisualArtifact::Unavailable.path(), None);
    }
}
