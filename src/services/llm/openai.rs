// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::LlmProvider;
use crate::config::{Config, Transport};
use crate::domain::StagedDiff;
use crate::error::{Error, Result};
use crate::services::prompt;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    transport: Transport,
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = SecretString::from(config.api_key()?.expose_secret().to_owned());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::completion(describe(&e)))?;

        Ok(Self {
            client,
            base_url: config
                .openai_base_url
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
            api_key,
            transport: config.transport,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    async fn send(&self, request: &ChatRequest<'_>, cancel: &CancellationToken) -> Result<Response> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %self.model, stream = request.stream, "sending completion request");

        let pending = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = pending => response.map_err(request_error)?,
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::completion(format!(
                "HTTP {status}: {}",
                api_error_message(&body)
            )));
        }

        Ok(response)
    }

    async fn stream_completion(
        &self,
        response: Response,
        token_tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<String> {
        let mut stream = response.bytes_stream();
        let mut full_response = String::new();
        // Chunks are not aligned to lines or to UTF-8 boundaries
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(Error::Cancelled);
                }
                chunk = stream.next() => {
                    let Some(chunk) = chunk else { break };
                    let chunk = chunk.map_err(request_error)?;
                    buffer.extend_from_slice(&chunk);

                    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line: Vec<u8> = buffer.drain(..=pos).collect();
                        if apply_event_line(&line, &mut full_response, &token_tx).await? {
                            return Ok(full_response);
                        }
                    }
                }
            }
        }

        if !buffer.is_empty() && apply_event_line(&buffer, &mut full_response, &token_tx).await? {
            return Ok(full_response);
        }

        // Neither `[DONE]` nor a finish_reason: truncated, or not SSE at all
        debug!(received = full_response.len(), "stream closed without terminator");
        Err(Error::completion("stream ended before completion"))
    }

    async fn blocking_completion(
        &self,
        response: Response,
        cancel: CancellationToken,
    ) -> Result<String> {
        let body: ChatResponse = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            body = response.json::<ChatResponse>() => body
                .map_err(|e| Error::completion(format!("malformed response: {}", describe(&e))))?,
        };

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::completion("response contained no message"))?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(
        &self,
        diff: &StagedDiff,
        token_tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<String> {
        let diff_message = prompt::diff_message(diff);
        let streaming = self.transport == Transport::Stream;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "user",
                    content: prompt::INSTRUCTIONS,
                },
                Message {
                    role: "user",
                    content: &diff_message,
                },
            ],
            temperature: self.temperature,
            max_tokens: (!streaming).then_some(self.max_tokens),
            stream: streaming,
        };

        let response = self.send(&request, &cancel).await?;

        if streaming {
            self.stream_completion(response, token_tx, cancel).await
        } else {
            self.blocking_completion(response, cancel).await
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Handle one server-sent event line. Returns `true` once the stream is done.
async fn apply_event_line(
    line: &[u8],
    full_response: &mut String,
    token_tx: &mpsc::Sender<String>,
) -> Result<bool> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();

    // Blank separators, `: keep-alive` comments and `event:` fields
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(false);
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        return Ok(true);
    }

    let chunk: ChatChunk = serde_json::from_str(data)
        .map_err(|e| Error::completion(format!("malformed stream data: {e}")))?;

    if let Some(error) = chunk.error {
        return Err(Error::completion(error.message));
    }

    let mut done = false;
    for choice in chunk.choices {
        if let Some(content) = choice.delta.content {
            full_response.push_str(&content);
            let _ = token_tx.send(content).await;
        }
        if choice.finish_reason.is_some() {
            done = true;
        }
    }

    Ok(done)
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.trim().to_string(),
    }
}

fn request_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::completion("request timed out")
    } else {
        Error::completion(describe(&e))
    }
}

/// reqwest's top-level message hides the cause; walk the source chain.
fn describe(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
