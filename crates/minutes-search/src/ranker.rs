//! Brute-force similarity ranking over the stored chunk corpus.
//!
//! Every search compares the query vector against every stored chunk. This
//! is O(n) per query and correct; an index structure can replace it later
//! without changing the contract.

use minutes_core::types::{CorpusChunk, RankedChunk};

/// Compute cosine similarity between two vectors.
///
/// Accumulates in f64. Returns 0.0 for mismatched lengths and for vectors
/// with zero magnitude, so degenerate entries rank last instead of raising.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();

    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

/// Orders corpus chunks by similarity to a query vector.
pub struct SimilarityRanker;

impl SimilarityRanker {
    /// Score every chunk against `query` and return the top `k`.
    ///
    /// Results are sorted by descending similarity; equal scores fall back
    /// to ascending chunk index, then ascending meeting id, giving one
    /// deterministic total order. Fewer than `k` chunks returns them all.
    pub fn rank(query: &[f32], corpus: Vec<CorpusChunk>, k: usize) -> Vec<RankedChunk> {
        let mut results: Vec<RankedChunk> = corpus
            .into_iter()
            .map(|chunk| {
                let similarity = cosine_similarity(query, &chunk.embedding);
                RankedChunk {
                    meeting_id: chunk.meeting_id,
                    chunk_index: chunk.chunk_index,
                    text: chunk.text,
                    similarity,
                    title: chunk.title,
                    summary: chunk.summary,
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_index.cmp(&b.chunk_index))
                .then_with(|| a.meeting_id.cmp(&b.meeting_id))
        });
        results.truncate(k);
        results
    }
}
