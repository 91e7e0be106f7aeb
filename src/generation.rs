use crate::error::Result;

/// Text-completion backend used to produce answers
#[allow(async_fn_in_trait)]
pub trait Generator {
    /// Complete `prompt`, producing at most `max_tokens` tokens.
    ///
    /// Any non-success upstream response is reported as
    /// [`RagError::Service`](crate::error::RagError::Service).
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}
