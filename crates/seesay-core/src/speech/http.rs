//! HTTP speech backend for OpenAI-compatible `/v1/audio/speech` services.
//!
//! Works against OpenAI itself and against edge-tts bridge servers that
//! accept neural voice names such as `en-US-GuyNeural`. The response body is
//! streamed into the output file the synthesizer reserved; the synthesizer
//! also removes it when the call fails.

use super::backend::{SpeechBackend, SynthesisRequest};
use crate::config::{resolve_env_var, SpeechConfig};
use crate::error::PipelineError;
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Serialize;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Speech backend talking to an OpenAI-compatible speech endpoint.
pub struct HttpSpeechBackend {
    url: String,
    api_key: Option<String>,
    model: String,
    format: String,
    client: reqwest::Client,
}

impl HttpSpeechBackend {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            url: format!("{}/v1/audio/speech", config.endpoint.trim_end_matches('/')),
            api_key: resolve_env_var(&config.api_key),
            model: config.model.clone(),
            format: config.format.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn error(&self, request: &SynthesisRequest, message: String, status: Option<u16>) -> PipelineError {
        PipelineError::Speech {
            voice: request.voice().to_string(),
            message,
            status_code: status,
        }
    }
}

/// `/v1/audio/speech` request body.
#[derive(Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    speed: f32,
}

#[async_trait]
impl SpeechBackend for HttpSpeechBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        output: &Path,
    ) -> Result<(), PipelineError> {
        let body = SpeechBody {
            model: &self.model,
            input: request.text(),
            voice: request.voice(),
            response_format: &self.format,
            speed: request.rate().multiplier(),
        };

        let mut builder = self.client.post(&self.url).json(&body);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| self.error(request, format!("request failed: {e}"), None))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(self.error(
                request,
                format!("HTTP {status}: {text}"),
                Some(status.as_u16()),
            ));
        }

        // `output` is already reserved by the synthesizer; never create it here
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(output)
            .await
            .map_err(|e| PipelineError::filesystem(output, e))?;
        let mut stream = resp.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    return Err(self.error(request, format!("audio stream broke: {e}"), None));
                }
            };
            file.write_all(&chunk)
                .await
                .map_err(|e| PipelineError::filesystem(output, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| PipelineError::filesystem(output, e))?;

        if written == 0 {
            return Err(self.error(request, "service returned no audio".to_string(), None));
        }

        tracing::debug!(voice = request.voice(), bytes = written, "Audio stream saved");
        Ok(())
    }
}
