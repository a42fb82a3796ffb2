//! Chunking, embedding, and semantic search over stored meetings.
//!
//! Provides the transcript chunker, the brute-force cosine ranker, the
//! embedding indexer used at ingestion time, and the search engine that
//! embeds queries and scans the stored corpus.

pub mod chunker;
pub mod engine;
pub mod indexer;
pub mod ranker;

pub use chunker::Chunker;
pub use engine::SearchEngine;
pub use indexer::EmbeddingIndexer;
pub use ranker::{cosine_similarity, SimilarityRanker};
