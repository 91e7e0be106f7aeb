//! Deterministic stand-ins for the network collaborators.

use crate::embeddings::{Embedding, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::generation::Generator;
use std::sync::Mutex;

/// Embeds text as its a-z letter histogram
pub struct LetterEmbedder;

impl EmbeddingProvider for LetterEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Embedding> {
        let mut values = vec![0.0; 26];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            values[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Ok(Embedding::new(values))
    }
}

/// Always fails as a rate-limited upstream would
pub struct FailingEmbedder;

impl EmbeddingProvider for FailingEmbedder {
    async fn embed_one(&self, _text: &str) -> Result<Embedding> {
        Err(RagError::service_with_code(
            "fake-embedder",
            429,
            "Too Many Requests",
        ))
    }
}

/// Records every prompt and replies with a canned answer
#[derive(Default)]
pub struct RecordingGenerator {
    pub prompts: Mutex<Vec<(String, u32)>>,
}

impl RecordingGenerator {
    pub fn prompts(&self) -> Vec<(String, u32)> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Generator for RecordingGenerator {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), max_tokens));
        Ok("generated answer".to_string())
    }
}

/// Fails with a fixed upstream status
pub struct FailingGenerator {
    pub status: i32,
}

impl Generator for FailingGenerator {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        Err(RagError::service_with_code(
            "fake-generator",
            self.status,
            "Service Unavailable",
        ))
    }
}
