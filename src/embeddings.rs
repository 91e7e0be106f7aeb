use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Representation of a vector embedding
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Embedding { values }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

/// Maps text to fixed-dimension vectors.
///
/// Implementations must be deterministic for a fixed model and must return
/// one vector per input, in input order.
#[allow(async_fn_in_trait)]
pub trait EmbeddingProvider {
    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Embedding>;

    /// Embed a batch of texts. An empty batch yields an empty result.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            embeddings.push(self.embed_one(text).await?);
        }

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LetterEmbedder;

    #[tokio::test]
    async fn test_empty_batch() {
        let embeddings = LetterEmbedder.embed(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let texts = vec!["apple".to_string(), "zebra".to_string()];
        let embeddings = LetterEmbedder.embed(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0], LetterEmbedder.embed_one("apple").await.unwrap());
        assert_eq!(embeddings[1], LetterEmbedder.embed_one("zebra").await.unwrap());
        assert_eq!(embeddings[0].dimension(), 26);
    }
}
