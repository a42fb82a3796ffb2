//! Search engine combining query embedding with the corpus scan.
//!
//! Every search embeds the query once, loads the full chunk corpus from the
//! store, and ranks it with [`SimilarityRanker`]. Meetings that never got
//! chunks simply contribute no rows to the scan.

use tracing::debug;

use minutes_core::error::MinutesError;
use minutes_core::types::RankedChunk;
use minutes_openai::capability::{DynEmbeddingService, EmbeddingService};
use minutes_storage::repository::ChunkRepository;

use crate::ranker::SimilarityRanker;

/// Semantic search over all indexed meetings.
///
/// Uses dynamic dispatch (`Box<dyn DynEmbeddingService>`) so that production
/// code can supply `OpenAiClient` while tests use `MockEmbedding`.
pub struct SearchEngine {
    chunks: ChunkRepository,
    embedder: Box<dyn DynEmbeddingService>,
    default_k: usize,
}

impl SearchEngine {
    /// Create a search engine over the chunk store.
    pub fn new(
        chunks: ChunkRepository,
        embedder: impl EmbeddingService + 'static,
        default_k: usize,
    ) -> Self {
        Self {
            chunks,
            embedder: Box::new(embedder),
            default_k,
        }
    }

    /// Create a search engine from a pre-boxed dynamic embedding service.
    pub fn new_dyn(
        chunks: ChunkRepository,
        embedder: Box<dyn DynEmbeddingService>,
        default_k: usize,
    ) -> Self {
        Self {
            chunks,
            embedder,
            default_k,
        }
    }

    /// Embed the query and return the top `k` chunks across all meetings.
    ///
    /// `k` falls back to the configured default when absent. A blank query
    /// is a validation error; search never reaches the embedding service.
    pub async fn search(
        &self,
        query: &str,
        k: Option<usize>,
    ) -> Result<Vec<RankedChunk>, MinutesError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MinutesError::Validation(
                "Search query is empty".to_string(),
            ));
        }
        let k = k.unwrap_or(self.default_k);

        let query_vec = self.embedder.embed_boxed(query).await?;
        let corpus = self.chunks.corpus()?;
        let scanned = corpus.len();
        let results = SimilarityRanker::rank(&query_vec, corpus, k);

        debug!(query_chars = query.len(), scanned, returned = results.len(), "Search complete");
        Ok(results)
    }
}
