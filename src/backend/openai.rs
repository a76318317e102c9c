#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;

use crate::backend::{ArcBackend, Backend};
use crate::config::user_agent;
use crate::models::{BackendConnection, GenerationPrompt};
use async_trait::async_trait;
use eyre::{Context, Result, bail};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time;
use thiserror::Error;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

/// Client for an OpenAI-compatible chat-completion endpoint. The streamed
/// deltas are accumulated into a single reply string; the pipeline consumes
/// generation output as one opaque value.
pub struct OpenAI {
    alias: String,
    endpoint: String,
    api_key: Option<String>,
    timeout: Option<time::Duration>,

    max_output_tokens: Option<usize>,
}

#[async_trait]
impl Backend for OpenAI {
    fn name(&self) -> &str {
        &self.alias
    }

    async fn health_check(&self) -> Result<()> {
        let mut req = reqwest::Client::new()
            .get(format!("{}/v1/models", self.endpoint))
            .header("User-Agent", user_agent());

        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        if let Some(token) = &self.api_key {
            req = req.bearer_auth(token);
        }

        let res = req.send().await.wrap_err("sending health check request")?;
        if !res.status().is_success() {
            bail!("health check failed with status {}", res.status());
        }
        Ok(())
    }

    async fn generate(&self, prompt: GenerationPrompt) -> Result<String> {
        if prompt.model().is_empty() {
            bail!("no model is set");
        }

        let mut messages = vec![];
        if !prompt.system().is_empty() {
            messages.push(MessageRequest {
                role: "system".to_string(),
                content: prompt.system().to_string(),
            });
        }
        messages.push(MessageRequest {
            role: "user".to_string(),
            content: prompt.text().to_string(),
        });

        let completion_req = CompletionRequest {
            model: prompt.model().to_string(),
            messages,
            stream: true,
            max_completion_tokens: self.max_output_tokens,
        };

        let mut req = reqwest::Client::new()
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .header("Content-Type", "application/json")
            .header("User-Agent", user_agent());

        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        if let Some(token) = &self.api_key {
            req = req.bearer_auth(token);
        }

        log::trace!("Sending completion request: {:?}", completion_req);

        let res = req
            .json(&completion_req)
            .send()
            .await
            .wrap_err("sending completion request")?;

        if !res.status().is_success() {
            let http_code = res.status().as_u16();
            let resp = res.text().await.wrap_err("parsing error response")?;
            log::error!("Error response: {}", resp);
            let err = serde_json::from_str::<ErrorResponse>(&resp)
                .wrap_err(format!("parsing error response: {}", resp))?;
            let mut err = err.error;
            err.http_code = http_code;
            return Err(err.into());
        }

        let stream = res.bytes_stream().map_err(|e| {
            let err_msg = e.to_string();
            std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg)
        });

        let mut line_readers = StreamReader::new(stream).lines();

        let mut text = String::new();
        while let Ok(line) = line_readers.next_line().await {
            if line.is_none() {
                break;
            }

            let mut line = line.unwrap().trim().to_string();
            log::trace!("streaming response: {}", line);
            if !line.starts_with("data: ") {
                continue;
            }

            line = line[6..].to_string();
            if line == "[DONE]" {
                break;
            }

            let data = serde_json::from_str::<CompletionResponse>(&line)
                .wrap_err(format!("parsing completion response line: {}", line))?;

            let c = match data.choices.first() {
                Some(c) => c,
                None => continue,
            };

            if let Some(delta) = &c.delta.content {
                text.push_str(delta);
            }
        }

        Ok(text)
    }
}

impl From<OpenAI> for ArcBackend {
    fn from(value: OpenAI) -> Self {
        std::sync::Arc::new(value)
    }
}

impl From<&BackendConnection> for OpenAI {
    fn from(value: &BackendConnection) -> Self {
        let mut openai = OpenAI::default().with_endpoint(value.endpoint());

        if let Some(api_key) = value.api_key() {
            openai.api_key = Some(api_key.to_string());
        }

        if let Some(timeout) = value.timeout() {
            openai.timeout = Some(timeout);
        }

        if let Some(alias) = value.alias() {
            openai.alias = alias.to_string();
        }

        openai.max_output_tokens = value.max_output_tokens();
        openai
    }
}

impl OpenAI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: usize) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn timeout(&self) -> Option<time::Duration> {
        self.timeout
    }
}

impl Default for OpenAI {
    fn default() -> Self {
        Self {
            alias: "OpenAI".to_string(),
            endpoint: "https://api.openai.com".to_string(),
            api_key: None,
            timeout: None,
            max_output_tokens: None,
        }
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
struct MessageRequest {
    role: String,
    content: String,
}

#[derive(Default, Debug, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<MessageRequest>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<usize>,
}

#[derive(Default, Debug, Serialize, Deserialize)]
struct CompletionDeltaResponse {
    content: Option<String>,
}

#[derive(Default, Debug, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    delta: CompletionDeltaResponse,
    finish_reason: Option<String>,
}

#[derive(Default, Debug, Serialize, Deserialize)]
struct CompletionResponse {
    id: String,
    choices: Vec<CompletionChoiceResponse>,
}

#[derive(Default, Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Default, Error, Debug, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(skip)]
    pub http_code: u16,
    pub message: String,
    #[serde(rename = "type")]
    pub err_type: String,
    pub param: Option<String>,
    pub code: Option<String>,
}

impl Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OpenAI error ({}): {}", self.http_code, self.message)
    }
}
