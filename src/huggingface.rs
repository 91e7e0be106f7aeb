use crate::error::{RagError, Result};
use crate::generation::Generator;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const SERVICE: &str = "huggingface";

const DEFAULT_URL: &str = "https://router.huggingface.co/v1/chat/completions";
const DEFAULT_MODEL: &str = "meta-llama/Llama-3.2-3B-Instruct";
const TEMPERATURE: f32 = 0.4;

/// Configuration for the Hugging Face inference router
#[derive(Clone, Debug)]
pub struct HuggingFaceConfig {
    pub token: String,
    pub model: String,
    pub url: String,
}

impl HuggingFaceConfig {
    /// Create a new configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let token = env::var("HF_TOKEN").context("HF_TOKEN not set")?;
        let model = env::var("HF_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let url = env::var("HF_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());

        Ok(HuggingFaceConfig { token, model, url })
    }
}

/// Generator backed by the OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct HuggingFaceClient {
    config: HuggingFaceConfig,
    client: reqwest::Client,
}

impl HuggingFaceClient {
    pub fn new(config: HuggingFaceConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::from_http(SERVICE, e))?;
        Ok(HuggingFaceClient { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

impl Generator for HuggingFaceClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.token)
            .json(&request)
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

        let response_data: ChatResponse = response
            .json()
            .await
            .map_err(|e| RagError::service(SERVICE, format!("Malformed response: {}", e)))?;

        first_choice(response_data)
    }
}

fn first_choice(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| RagError::service(SERVICE, "No choices in response"))
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: String,
}
