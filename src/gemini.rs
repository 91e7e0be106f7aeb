use crate::embeddings::{Embedding, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::generation::Generator;
use anyhow::Context;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const SERVICE: &str = "gemini";

const DEFAULT_EMBEDDINGS_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/text-embedding-004:embedContent";
const DEFAULT_GENERATE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const DEFAULT_EMBEDDING_MODEL: &str = "models/text-embedding-004";
const DEFAULT_GENERATE_MODEL: &str = "models/gemini-2.0-flash";

/// Configuration for Gemini API
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub embeddings_url: String,
    pub generate_url: String,
    pub embedding_model: String,
    pub generate_model: String,
}

impl GeminiConfig {
    /// Create a new configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("GEMINI_API_KEY").context("GEMINI_API_KEY not set")?;
        // Default URLs if not specified
        let embeddings_url = env::var("GEMINI_EMBEDDINGS_URL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDINGS_URL.to_string());
        let generate_url =
            env::var("GEMINI_GENERATE_URL").unwrap_or_else(|_| DEFAULT_GENERATE_URL.to_string());
        let embedding_model = env::var("GEMINI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());
        let generate_model = env::var("GEMINI_GENERATE_MODEL")
            .unwrap_or_else(|_| DEFAULT_GENERATE_MODEL.to_string());

        Ok(GeminiConfig {
            api_key,
            embeddings_url,
            generate_url,
            embedding_model,
            generate_model,
        })
    }
}

/// Client for interacting with Gemini API
#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client whose requests give up after `timeout`
    pub fn new(config: GeminiConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::from_http(SERVICE, e))?;
        Ok(GeminiClient { config, client })
    }

    /// Get the client configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Generate embeddings for a text
    pub async fn get_embedding(&self, text: &str) -> Result<Embedding> {
        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            content: EmbeddingContent {
                parts: vec![Part { text }],
            },
        };

        let url = format!("{}?key={}", self.config.embeddings_url, self.config.api_key);
        let response_data: EmbeddingResponse = self.post(&url, &request).await?;

        Ok(Embedding {
            values: response_data.embedding.values,
        })
    }

    /// Generate text using Gemini model
    pub async fn generate_text(
        &self,
        prompt: &str,
        temperature: f32,
        top_p: f32,
        top_k: i32,
        max_output_tokens: u32,
    ) -> Result<String> {
        let request = GenerateRequest {
            model: &self.config.generate_model,
            contents: vec![Content::new_with_role(prompt, "user")],
            generation_config: GenerationConfig {
                temperature,
                top_p,
                top_k,
                max_output_tokens,
            },
        };

        let url = format!("{}?key={}", self.config.generate_url, self.config.api_key);
        let response_data: GenerateResponse = self.post(&url, &request).await?;

        extract_text(response_data)
    }

    async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: &str,
        request: &Req,
    ) -> Result<Resp> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| RagError::from_http(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::service_with_code(
                SERVICE,
                i32::from(status.as_u16()),
                error_text,
            ));
        }

        response
            .json()
            .await
            .map_err(|e| RagError::service(SERVICE, format!("Malformed response: {}", e)))
    }
}

impl EmbeddingProvider for GeminiClient {
    async fn embed_one(&self, text: &str) -> Result<Embedding> {
        self.get_embedding(text).await
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (i, text) in texts.iter().enumerate() {
            debug!("Embedding chunk {}/{}", i + 1, texts.len());
            embeddings.push(self.get_embedding(text).await?);
        }

        Ok(embeddings)
    }
}

impl Generator for GeminiClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        self.generate_text(prompt, 0.2, 0.8, 40, max_tokens).await
    }
}

/// Extract the generated text from the response
fn extract_text(response: GenerateResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| RagError::service(SERVICE, "No response generated"))
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    content: EmbeddingContent<'a>,
}

#[derive(Serialize)]
struct EmbeddingContent<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Deserialize, Debug)]
struct EmbeddingResponse {
    embedding: EmbeddingData,
}

#[derive(Deserialize, Debug)]
struct EmbeddingData {
    values: Vec<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    model: &'a str,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
    role: &'static str,
}

impl<'a> Content<'a> {
    fn new_with_role(text: &'a str, role: &'static str) -> Self {
        Content {
            parts: vec![Part { text }],
            role,
        }
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize, Debug)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            model: "models/gemini-2.0-flash",
            contents: vec![Content::new_with_role("hi", "user")],
            generation_config: GenerationConfig {
                temperature: 0.5,
                top_p: 0.8,
                top_k: 40,
                max_output_tokens: 300,
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 300);
        assert_eq!(value["generationConfig"]["topK"], 40);
    }

    #[test]
    fn test_extract_text() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}, {"text": "second"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "first");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let response: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(RagError::Service { code: None, .. })
        ));
    }

    #[test]
    fn test_embedding_response() {
        let response: EmbeddingResponse =
            serde_json::from_value(json!({"embedding": {"values": [0.5, -0.25]}})).unwrap();
        assert_eq!(response.embedding.values, vec![0.5, -0.25]);
    }
}
