//! OpenAI-compatible vision provider using the Chat Completions API.
//!
//! Sends the image as a data URL in the user message content array. Works
//! with any service exposing the same `/chat/completions` format.

use super::provider::{VisionProvider, VisionRequest, VisionResponse};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            url: format!("{}/chat/completions", endpoint.trim_end_matches('/')),
            timeout,
            client: reqwest::Client::new(),
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl VisionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, PipelineError> {
        let start = Instant::now();

        let body = ChatRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: vec![ChatContent::Text {
                        text: request.system_prompt.clone(),
                    }],
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: vec![
                        ChatContent::ImageUrl {
                            image_url: ImageUrl {
                                url: request.image.data_url(),
                            },
                        },
                        ChatContent::Text {
                            text: request.prompt.clone(),
                        },
                    ],
                },
            ],
        };

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PipelineError::Vision {
                message: format!("OpenAI request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Vision {
                message: format!("OpenAI HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| PipelineError::Vision {
            message: format!("Failed to parse OpenAI response: {e}"),
            status_code: None,
        })?;

        let choice = chat_resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Vision {
                message: "OpenAI returned empty choices array".to_string(),
                status_code: None,
            })?;

        Ok(VisionResponse {
            text: choice.message.content.unwrap_or_default().trim().to_string(),
            model: chat_resp.model,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
