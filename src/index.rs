//! Vector index contract and an in-memory implementation.
//!
//! Both indexes shipped with this crate score hits by cosine similarity:
//! higher is closer, and results come back best match first.

use crate::embeddings::Embedding;
use crate::error::{RagError, Result};
use tokio::sync::RwLock;

/// Metadata stored alongside each indexed chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Position of the chunk assigned at build time
    pub chunk_index: usize,
}

/// A chunk registered in a vector index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub vector: Embedding,
}

/// A single nearest-neighbor match
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalHit {
    pub text: String,
    /// Missing when the index returned a point without chunk metadata
    pub metadata: Option<ChunkMetadata>,
    pub score: f32,
}

/// Nearest-neighbor storage for embedded chunks
#[allow(async_fn_in_trait)]
pub trait VectorIndex {
    /// Register chunks. Existing ids are overwritten.
    async fn upsert(&self, chunks: Vec<IndexedChunk>) -> Result<()>;

    /// Return at most `top_k` hits for `vector`, best match first
    async fn query(&self, vector: &Embedding, top_k: usize) -> Result<Vec<RetrievalHit>>;
}

/// Brute-force cosine index held in process memory
#[derive(Debug, Default)]
pub struct MemoryIndex {
    chunks: RwLock<Vec<IndexedChunk>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }
}

impl VectorIndex for MemoryIndex {
    async fn upsert(&self, chunks: Vec<IndexedChunk>) -> Result<()> {
        let mut stored = self.chunks.write().await;

        // All vectors in one index share a dimension
        let expected = stored
            .first()
            .or_else(|| chunks.first())
            .map(|c| c.vector.dimension());
        if let Some(expected) = expected {
            if let Some(bad) = chunks.iter().find(|c| c.vector.dimension() != expected) {
                return Err(RagError::service(
                    "memory-index",
                    format!(
                        "vector dimension mismatch: expected {}, got {}",
                        expected,
                        bad.vector.dimension()
                    ),
                ));
            }
        }

        for chunk in chunks {
            match stored.iter_mut().find(|c| c.id == chunk.id) {
                Some(existing) => *existing = chunk,
                None => stored.push(chunk),
            }
        }

        Ok(())
    }

    async fn query(&self, vector: &Embedding, top_k: usize) -> Result<Vec<RetrievalHit>> {
        let stored = self.chunks.read().await;

        if let Some(first) = stored.first() {
            if first.vector.dimension() != vector.dimension() {
                return Err(RagError::service(
                    "memory-index",
                    format!(
                        "query dimension mismatch: expected {}, got {}",
                        first.vector.dimension(),
                        vector.dimension()
                    ),
                ));
            }
        }

        let mut scored: Vec<(f32, &IndexedChunk)> = stored
            .iter()
            .map(|chunk| (cosine_similarity(&vector.values, &chunk.vector.values), chunk))
            .collect();

        // Stable sort keeps insertion order between equal scores
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, chunk)| RetrievalHit {
                text: chunk.text.clone(),
                metadata: Some(chunk.metadata),
                score,
            })
            .collect())
    }
}

/// Cosine similarity in [-1, 1]; zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
