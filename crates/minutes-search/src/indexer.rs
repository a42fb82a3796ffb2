//! Chunk embedding for ingestion.
//!
//! EmbeddingIndexer turns a transcript into the ordered, embedded chunks the
//! search scan consumes. Indexing a meeting is all-or-nothing: the first
//! embedding failure aborts the whole batch and nothing is returned, so a
//! meeting is either fully searchable or not searchable at all.

use tracing::debug;

use minutes_core::error::MinutesError;
use minutes_core::types::StoredChunk;
use minutes_openai::capability::{DynEmbeddingService, EmbeddingService};

use crate::chunker::Chunker;

/// Embeds transcript chunks in order.
///
/// Uses dynamic dispatch (`Box<dyn DynEmbeddingService>`) so that production
/// code can supply `OpenAiClient` while tests use `MockEmbedding`.
pub struct EmbeddingIndexer {
    chunker: Chunker,
    embedder: Box<dyn DynEmbeddingService>,
}

impl EmbeddingIndexer {
    /// Create an indexer with the given chunker and embedding service.
    pub fn new(chunker: Chunker, embedder: impl EmbeddingService + 'static) -> Self {
        Self {
            chunker,
            embedder: Box::new(embedder),
        }
    }

    /// Create an indexer from a pre-boxed dynamic embedding service.
    pub fn new_dyn(chunker: Chunker, embedder: Box<dyn DynEmbeddingService>) -> Self {
        Self { chunker, embedder }
    }

    /// Chunk the transcript and embed every chunk, preserving chunk order.
    ///
    /// Each vector must have the corpus-fixed dimension the embedding
    /// service reports; any other length would corrupt later similarity
    /// comparisons and is an error. An empty transcript yields an empty
    /// batch.
    pub async fn index_transcript(
        &self,
        transcript: &str,
    ) -> Result<Vec<StoredChunk>, MinutesError> {
        let texts = self.chunker.chunk(transcript);
        let expected_dim = self.embedder.dimensions();

        let mut chunks = Vec::with_capacity(texts.len());
        for (index, text) in texts.into_iter().enumerate() {
            let embedding = self.embedder.embed_boxed(&text).await?;
            if embedding.len() != expected_dim {
                return Err(MinutesError::UpstreamService(format!(
                    "Embedding for chunk {} has dimension {} but the corpus dimension is {}",
                    index,
                    embedding.len(),
                    expected_dim
                )));
            }
            chunks.push(StoredChunk {
                index: index as u32,
                text,
                embedding,
            });
        }

        debug!(chunks = chunks.len(), "Transcript indexed");
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minutes_openai::mock::MockEmbedding;

    fn make_indexer(dimensions: usize) -> EmbeddingIndexer {
        EmbeddingIndexer::new(Chunker::new(10), MockEmbedding::new(dimensions))
    }

    #[tokio::test]
    async fn test_index_empty_transcript() {
        let indexer = make_indexer(8);
        let chunks = indexer.index_transcript("").await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_index_produces_contiguous_indices() {
        let indexer = make_indexer(8);
        let transcript = "x".repeat(35);
        let chunks = indexer.index_transcript(&transcript).await.unwrap();

        assert_eq!(chunks.len(), 4);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i as u32);
            assert_eq!(chunk.embedding.len(), 8);
        }
    }

    #[tokio::test]
    async fn test_index_embeds_each_chunk_text() {
        let indexer = make_indexer(8);
        let chunks = indexer
            .index_transcript("aaaaaaaaaabbbbbbbbbb")
            .await
            .unwrap();

        let reference = MockEmbedding::new(8);
        assert_eq!(
            chunks[0].embedding,
            reference.embed("aaaaaaaaaa").await.unwrap()
        );
        assert_eq!(
            chunks[1].embedding,
            reference.embed("bbbbbbbbbb").await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_index_aborts_on_embedding_failure() {
        let indexer =
            EmbeddingIndexer::new(Chunker::new(10), MockEmbedding::failing_after(8, 2));
        let transcript = "x".repeat(35);

        let result = indexer.index_transcript(&transcript).await;
        assert!(matches!(result, Err(MinutesError::UpstreamService(_))));
    }

    #[tokio::test]
    async fn test_index_rejects_dimension_drift() {
        struct DriftingEmbedder;

        impl EmbeddingService for DriftingEmbedder {
            async fn embed(&self, _text: &str) -> Result<Vec<f32>, MinutesError> {
                Ok(vec![0.5; 4])
            }

            fn dimensions(&self) -> usize {
                8
            }
        }

        let indexer = EmbeddingIndexer::new(Chunker::new(10), DriftingEmbedder);
        let result = indexer.index_transcript("some transcript").await;
        match result {
            Err(MinutesError::UpstreamService(msg)) => {
                assert!(msg.contains("dimension"), "got: {}", msg)
            }
            other => panic!("expected dimension error, got {:?}", other),
        }
    }
}
