use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::index::{RetrievalHit, VectorIndex};
use log::debug;

/// Embeds a question and looks it up in a vector index
pub struct Retriever<'a, E, V> {
    embedder: &'a E,
    index: &'a V,
}

impl<'a, E: EmbeddingProvider, V: VectorIndex> Retriever<'a, E, V> {
    pub fn new(embedder: &'a E, index: &'a V) -> Self {
        Retriever { embedder, index }
    }

    /// Return the index's top `top_k` hits for `question`, best first.
    ///
    /// Hits are passed through as the index returned them; errors from
    /// either collaborator propagate unchanged.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<RetrievalHit>> {
        let question_embedding = self.embedder.embed_one(question).await?;
        let hits = self.index.query(&question_embedding, top_k).await?;
        debug!("Retrieved {} hits for question", hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{ChunkMetadata, IndexedChunk, MemoryIndex};
    use crate::testing::{FailingEmbedder, LetterEmbedder};

    #[tokio::test]
    async fn test_retrieve_best_first() {
        let index = MemoryIndex::new();
        let mut chunks = Vec::new();
        for (i, text) in ["zzz yyy", "apples and bananas", "quartz"].iter().enumerate() {
            chunks.push(IndexedChunk {
                id: i.to_string(),
                text: text.to_string(),
                metadata: ChunkMetadata { chunk_index: i },
                vector: LetterEmbedder.embed_one(text).await.unwrap(),
            });
        }
        index.upsert(chunks).await.unwrap();

        let retriever = Retriever::new(&LetterEmbedder, &index);
        let hits = retriever.retrieve("bananas", 2).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "apples and bananas");
    }

    #[tokio::test]
    async fn test_retrieve_from_empty_index() {
        let index = MemoryIndex::new();
        let retriever = Retriever::new(&LetterEmbedder, &index);
        assert!(retriever.retrieve("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let index = MemoryIndex::new();
        let retriever = Retriever::new(&FailingEmbedder, &index);
        let err = retriever.retrieve("anything", 5).await.unwrap_err();
        assert_eq!(err.code(), Some(429));
    }
}
