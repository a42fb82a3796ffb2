//! Transcript chunking for embedding.
//!
//! Splits text into fixed-size character segments. Chunking is a pure
//! function of (text, size): no trimming, no overlap, no side effects.

/// Splits transcripts into bounded segments.
///
/// Sizes are counted in characters, not bytes, so multi-byte text never
/// splits inside a code point.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
}

impl Chunker {
    /// Create a chunker with the given segment size. A size of zero is
    /// clamped to one.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Partition `text` into contiguous segments of `chunk_size` characters.
    ///
    /// Every segment except possibly the last has exactly `chunk_size`
    /// characters; the last holds the remainder. Empty input produces an
    /// empty vector, not one empty chunk.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::with_capacity(self.chunk_size);
        let mut count = 0;

        for ch in text.chars() {
            current.push(ch);
            count += 1;
            if count == self.chunk_size {
                chunks.push(std::mem::take(&mut current));
                count = 0;
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}
