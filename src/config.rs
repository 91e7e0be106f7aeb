use crate::error::{RagError, Result};
use std::time::Duration;

pub const DEFAULT_CHUNK_SIZE: usize = 800;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MAX_TOKENS: u32 = 300;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Tunables for chunking, retrieval and generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Window width of the chunker, in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub overlap: usize,
    /// Number of passages retrieved per question
    pub top_k: usize,
    /// Token budget handed to the generator
    pub max_tokens: u32,
    /// Timeout applied to every outbound HTTP request
    pub request_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PipelineConfig {
    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        validate_chunking(self.chunk_size, self.overlap)?;
        if self.top_k == 0 {
            return Err(RagError::Configuration(
                "top_k must be at least 1".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(RagError::Configuration(
                "max_tokens must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Chunking walks forward by `chunk_size - overlap`, which must be positive
pub fn validate_chunking(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::Configuration(
            "chunk_size must be at least 1".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(RagError::Configuration(format!(
            "overlap ({}) must be smaller than chunk_size ({})",
            overlap, chunk_size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = PipelineConfig {
            overlap: 800,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RagError::Configuration(_))
        ));

        let config = PipelineConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RagError::Configuration(_))
        ));

        let config = PipelineConfig {
            max_tokens: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(validate_chunking(0, 0).is_err());
    }
}
