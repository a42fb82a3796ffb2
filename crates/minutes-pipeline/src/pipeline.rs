//! The ingestion pipeline: one upload in, one indexed meeting out.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use minutes_analysis::{ContentAnalyzer, VisualSynthesizer};
use minutes_core::error::MinutesError;
use minutes_core::types::{Meeting, MeetingId};
use minutes_openai::{DynTranscriptionService, TranscriptionService};
use minutes_search::EmbeddingIndexer;
use minutes_storage::{ArtifactStore, ChunkRepository, Database, MeetingRepository};

use crate::stage::PipelineStage;

/// One uploaded recording plus its metadata.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub title: String,
    pub attendees: String,
    pub file_name: String,
    pub audio: Vec<u8>,
}

/// Drives one upload through every stage in order.
///
/// Every collaborator is injected at construction, so tests can substitute
/// deterministic services. The pipeline owns no retry logic: any failing
/// stage (except visual synthesis) aborts the run and the error propagates
/// to the caller. Writes that already happened stay; there is no cross-stage
/// rollback.
pub struct MeetingPipeline {
    transcription: Box<dyn DynTranscriptionService>,
    analyzer: ContentAnalyzer,
    visuals: VisualSynthesizer,
    indexer: EmbeddingIndexer,
    meetings: MeetingRepository,
    chunks: ChunkRepository,
    artifacts: ArtifactStore,
    allowed_extensions: Vec<String>,
}

impl MeetingPipeline {
    pub fn new(
        transcription: impl TranscriptionService + 'static,
        analyzer: ContentAnalyzer,
        visuals: VisualSynthesizer,
        indexer: EmbeddingIndexer,
        db: Arc<Database>,
        artifacts: ArtifactStore,
        allowed_extensions: Vec<String>,
    ) -> Self {
        Self::new_dyn(
            Box::new(transcription),
            analyzer,
            visuals,
            indexer,
            db,
            artifacts,
            allowed_extensions,
        )
    }

    pub fn new_dyn(
        transcription: Box<dyn DynTranscriptionService>,
        analyzer: ContentAnalyzer,
        visuals: VisualSynthesizer,
        indexer: EmbeddingIndexer,
        db: Arc<Database>,
        artifacts: ArtifactStore,
        allowed_extensions: Vec<String>,
    ) -> Self {
        Self {
            transcription,
            analyzer,
            visuals,
            indexer,
            meetings: MeetingRepository::new(db.clone()),
            chunks: ChunkRepository::new(db),
            artifacts,
            allowed_extensions,
        }
    }

    /// Process one upload end to end and return the new meeting's id.
    ///
    /// A failure after the meeting record was stored (that is, during chunk
    /// indexing) still returns the error; the record stays retrievable with
    /// zero chunks and contributes nothing to search.
    pub async fn process_upload(&self, request: UploadRequest) -> Result<MeetingId, MinutesError> {
        self.validate(&request)?;

        let id = MeetingId::new();
        info!(
            meeting_id = %id,
            file = %request.file_name,
            bytes = request.audio.len(),
            stage = %PipelineStage::Received,
            "Processing upload"
        );
        let audio_path = self.artifacts.save_upload(&request.file_name, &request.audio)?;

        let transcription = self
            .transcription
            .transcribe_boxed(&request.audio, &request.file_name)
            .await?;
        info!(
            meeting_id = %id,
            stage = %PipelineStage::Transcribed,
            chars = transcription.text.len(),
            duration_secs = transcription.duration_secs,
            "Transcription complete"
        );

        let analysis = self.analyzer.analyze(&transcription.text).await?;
        info!(
            meeting_id = %id,
            stage = %PipelineStage::Analyzed,
            action_items = analysis.action_items.len(),
            decisions = analysis.decisions.len(),
            "Analysis complete"
        );

        let visual = self.visuals.synthesize(&analysis.summary, &request.title).await;
        info!(
            meeting_id = %id,
            stage = %PipelineStage::Visualized,
            stored = visual.path().is_some(),
            "Visual stage finished"
        );

        let meeting = Meeting {
            id,
            title: request.title,
            attendees: request.attendees,
            transcript: transcription.text,
            summary: analysis.summary,
            action_items: analysis.action_items,
            decisions: analysis.decisions,
            duration_secs: transcription.duration_secs,
            audio_path,
            visual_path: visual.path().map(str::to_string),
            created_at: Utc::now(),
        };
        self.meetings.create(&meeting)?;
        info!(meeting_id = %id, stage = %PipelineStage::Persisted, "Meeting stored");

        let chunks = self.indexer.index_transcript(&meeting.transcript).await?;
        self.chunks.insert_batch(id, &chunks)?;
        info!(
            meeting_id = %id,
            stage = %PipelineStage::Indexed,
            chunks = chunks.len(),
            "Transcript indexed"
        );

        info!(meeting_id = %id, stage = %PipelineStage::Complete, "Pipeline complete");
        Ok(id)
    }

    fn validate(&self, request: &UploadRequest) -> Result<(), MinutesError> {
        if request.audio.is_empty() {
            return Err(MinutesError::Validation(
                "Uploaded audio is empty".to_string(),
            ));
        }
        let ext = Path::new(&request.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
            return Err(MinutesError::Validation(format!(
                "File type '{}' is not allowed",
                ext
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use minutes_analysis::prompts::{ACTION_ITEMS_TOOL, DECISIONS_TOOL};
    use minutes_openai::mock::{MockEmbedding, MockImage, MockLanguage, MockTranscription};
    use minutes_search::Chunker;
    use minutes_storage::Database;

    const DIMS: usize = 8;

    const ITEMS_ARGS: &str =
        r#"{"action_items": [{"task": "Draft roadmap", "owner": "Alice", "deadline": "Friday", "priority": "High"}]}"#;
    const DECISIONS_ARGS: &str =
        r#"{"decisions": [{"decision": "Ship in Q3", "rationale": "Demand", "impact": "High"}]}"#;

    struct Fixture {
        db: Arc<Database>,
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                db: Arc::new(Database::in_memory().unwrap()),
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn pipeline(
            &self,
            transcription: MockTranscription,
            language: MockLanguage,
            image: MockImage,
            embedding: MockEmbedding,
        ) -> MeetingPipeline {
            let artifacts = ArtifactStore::new(self.dir.path());
            MeetingPipeline::new(
                transcription,
                ContentAnalyzer::new(language, 12_000),
                VisualSynthesizer::new(image, artifacts.clone(), 500),
                EmbeddingIndexer::new(Chunker::new(1000), embedding),
                self.db.clone(),
                artifacts,
                vec!["mp3".to_string(), "wav".to_string(), "m4a".to_string()],
            )
        }

        fn meetings(&self) -> MeetingRepository {
            MeetingRepository::new(self.db.clone())
        }

        fn chunks(&self) -> ChunkRepository {
            ChunkRepository::new(self.db.clone())
        }
    }

    fn request(file_name: &str) -> UploadRequest {
        UploadRequest {
            title: "Weekly Sync".to_string(),
            attendees: "Alice, Bob".to_string(),
            file_name: file_name.to_string(),
            audio: vec![1, 2, 3, 4],
        }
    }

    fn happy_language() -> MockLanguage {
        MockLanguage::new()
            .with_tool_response(ACTION_ITEMS_TOOL, ITEMS_ARGS)
            .with_tool_response(DECISIONS_TOOL, DECISIONS_ARGS)
            .with_summary("The team planned Q3.")
    }

    // ---- Happy path ----

    #[tokio::test]
    async fn test_upload_processes_end_to_end() {
        let fixture = Fixture::new();
        let transcript = "a".repeat(2500);
        let pipeline = fixture.pipeline(
            MockTranscription::new(&transcript, 1800.0),
            happy_language(),
            MockImage::new(),
            MockEmbedding::new(DIMS),
        );

        let id = pipeline.process_upload(request("standup.mp3")).await.unwrap();

        let meeting = fixture.meetings().find_by_id(id).unwrap().unwrap();
        assert_eq!(meeting.title, "Weekly Sync");
        assert_eq!(meeting.attendees, "Alice, Bob");
        assert_eq!(meeting.transcript, transcript);
        assert_eq!(meeting.summary, "The team planned Q3.");
        assert_eq!(meeting.action_items.len(), 1);
        assert_eq!(meeting.decisions.len(), 1);
        assert_eq!(meeting.duration_secs, 1800.0);
        assert!(meeting.audio_path.starts_with("uploads/"));
        assert!(meeting.visual_path.as_deref().unwrap().starts_with("visuals/"));

        // 2500 chars at size 1000 make three chunks.
        assert_eq!(fixture.chunks().count_for_meeting(id).unwrap(), 3);
    }

    #[tokio::test]
    async fn test_upload_stores_audio_and_visual_files() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(
            MockTranscription::new("short transcript", 60.0),
            happy_language(),
            MockImage::new(),
            MockEmbedding::new(DIMS),
        );

        let id = pipeline.process_upload(request("standup.mp3")).await.unwrap();

        let meeting = fixture.meetings().find_by_id(id).unwrap().unwrap();
        let artifacts = ArtifactStore::new(fixture.dir.path());
        assert!(artifacts.resolve(&meeting.audio_path).exists());
        assert!(artifacts
            .resolve(meeting.visual_path.as_deref().unwrap())
            .exists());
    }

    #[tokio::test]
    async fn test_empty_transcript_yields_zero_chunks() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(
            MockTranscription::new("", 0.0),
            MockLanguage::new().with_summary(""),
            MockImage::new(),
            MockEmbedding::new(DIMS),
        );

        let id = pipeline.process_upload(request("standup.mp3")).await.unwrap();

        assert!(fixture.meetings().find_by_id(id).unwrap().is_some());
        assert_eq!(fixture.chunks().count_for_meeting(id).unwrap(), 0);
        assert!(fixture.chunks().corpus().unwrap().is_empty());
    }

    // ---- Validation ----

    #[tokio::test]
    async fn test_disallowed_extension_rejected_before_any_work() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(
            MockTranscription::new("t", 1.0),
            happy_language(),
            MockImage::new(),
            MockEmbedding::new(DIMS),
        );

        let result = pipeline.process_upload(request("notes.txt")).await;
        assert!(matches!(result, Err(MinutesError::Validation(_))));
        assert_eq!(fixture.meetings().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_extension_check_is_case_insensitive() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(
            MockTranscription::new("t", 1.0),
            happy_language(),
            MockImage::new(),
            MockEmbedding::new(DIMS),
        );

        assert!(pipeline.process_upload(request("REC.MP3")).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_audio_rejected() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(
            MockTranscription::new("t", 1.0),
            happy_language(),
            MockImage::new(),
            MockEmbedding::new(DIMS),
        );

        let mut req = request("standup.mp3");
        req.audio.clear();
        let result = pipeline.process_upload(req).await;
        assert!(matches!(result, Err(MinutesError::Validation(_))));
    }

    // ---- Transcription failure: nothing persisted ----

    #[tokio::test]
    async fn test_transcription_failure_persists_nothing() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(
            MockTranscription::failing(),
            happy_language(),
            MockImage::new(),
            MockEmbedding::new(DIMS),
        );

        let result = pipeline.process_upload(request("standup.mp3")).await;
        assert!(matches!(result, Err(MinutesError::UpstreamService(_))));
        assert_eq!(fixture.meetings().count().unwrap(), 0);
        assert_eq!(fixture.chunks().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_analysis_failure_persists_nothing() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(
            MockTranscription::new("a transcript", 60.0),
            MockLanguage::failing(),
            MockImage::new(),
            MockEmbedding::new(DIMS),
        );

        let result = pipeline.process_upload(request("standup.mp3")).await;
        assert!(matches!(result, Err(MinutesError::UpstreamService(_))));
        assert_eq!(fixture.meetings().count().unwrap(), 0);
    }

    // ---- Extraction declined: empty lists persisted ----

    #[tokio::test]
    async fn test_no_tool_calls_persists_empty_lists() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(
            MockTranscription::new("nothing actionable here", 60.0),
            MockLanguage::new().with_summary("Small talk."),
            MockImage::new(),
            MockEmbedding::new(DIMS),
        );

        let id = pipeline.process_upload(request("standup.mp3")).await.unwrap();

        let meeting = fixture.meetings().find_by_id(id).unwrap().unwrap();
        assert!(meeting.action_items.is_empty());
        assert!(meeting.decisions.is_empty());
        assert_eq!(fixture.chunks().count_for_meeting(id).unwrap(), 1);
    }

    // ---- Embedding failure mid-meeting: record retained, zero chunks ----

    #[tokio::test]
    async fn test_embedding_failure_keeps_meeting_without_chunks() {
        let fixture = Fixture::new();
        let transcript = "b".repeat(2500);
        let pipeline = fixture.pipeline(
            MockTranscription::new(&transcript, 900.0),
            happy_language(),
            MockImage::new(),
            MockEmbedding::failing_after(DIMS, 1),
        );

        let result = pipeline.process_upload(request("standup.mp3")).await;
        assert!(matches!(result, Err(MinutesError::UpstreamService(_))));

        // The record survives with zero chunks and is invisible to search.
        assert_eq!(fixture.meetings().count().unwrap(), 1);
        assert_eq!(fixture.chunks().count().unwrap(), 0);
        assert!(fixture.chunks().corpus().unwrap().is_empty());
    }

    // ---- Visual failure: degrade, not abort ----

    #[tokio::test]
    async fn test_image_failure_completes_without_visual() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(
            MockTranscription::new("a transcript", 60.0),
            happy_language(),
            MockImage::failing(),
            MockEmbedding::new(DIMS),
        );

        let id = pipeline.process_upload(request("standup.mp3")).await.unwrap();

        let meeting = fixture.meetings().find_by_id(id).unwrap().unwrap();
        assert!(meeting.visual_path.is_none());
        assert_eq!(fixture.chunks().count_for_meeting(id).unwrap(), 1);
    }

    // ---- Retry gets a fresh id ----

    #[tokio::test]
    async fn test_retried_upload_gets_new_id() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(
            MockTranscription::new("same audio twice", 60.0),
            happy_language(),
            MockImage::new(),
            MockEmbedding::new(DIMS),
        );

        let first = pipeline.process_upload(request("standup.mp3")).await.unwrap();
        let second = pipeline.process_upload(request("standup.mp3")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(fixture.meetings().count().unwrap(), 2);
    }
}
