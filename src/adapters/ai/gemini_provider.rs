//! Gemini Provider - GenerationService over Google's Generative Language API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.0-flash")
//!     .with_timeout(Duration::from_secs(60));
//!
//! let provider = GeminiProvider::new(config)?;
//! ```
//!
//! # Streaming
//!
//! Calls `streamGenerateContent?alt=sse`. The body is a Server-Sent Events
//! stream; each `data:` line carries one JSON chunk whose candidate parts hold
//! the next text delta. Network chunks do not align with lines, so bytes are
//! buffered until a full line is available.

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::conversation::{MessageRole, PromptBuilder};
use crate::ports::{Fragment, FragmentStream, GenerationError, GenerationRequest, GenerationService};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    /// Applies to connecting and to the whole response body.
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_secret(Secret::new(api_key.into()))
    }

    pub fn from_secret(api_key: Secret<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::InvalidRequest(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn send(&self, request: &GenerationRequest) -> Result<Response, GenerationError> {
        let body = to_gemini_request(request);

        self.client
            .post(self.stream_url())
            .header("x-goog-api-key", self.config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Unavailable(format!("timed out after {:?}", self.config.timeout))
                } else if e.is_connect() {
                    GenerationError::Network(format!("Connection failed: {}", e))
                } else {
                    GenerationError::Network(e.to_string())
                }
            })
    }

    async fn handle_response_status(response: Response) -> Result<Response, GenerationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => GenerationError::AuthenticationFailed,
            429 => GenerationError::RateLimited {
                retry_after_secs: parse_retry_delay(&error_body),
            },
            400 => GenerationError::InvalidRequest(error_body),
            500..=599 => GenerationError::Unavailable(format!("Server error {}: {}", status, error_body)),
            _ => GenerationError::Network(format!("Unexpected status {}: {}", status, error_body)),
        })
    }
}

#[async_trait]
impl GenerationService for GeminiProvider {
    async fn open_stream(&self, request: GenerationRequest) -> Result<FragmentStream, GenerationError> {
        let response = self.send(&request).await?;
        let response = Self::handle_response_status(response).await?;

        let fragments = response
            .bytes_stream()
            .scan(SseDecoder::default(), |decoder, chunk| {
                let items = match chunk {
                    Ok(bytes) => decoder.push(&bytes),
                    Err(e) => vec![Err(GenerationError::Network(format!("Stream error: {}", e)))],
                };
                future::ready(Some(stream::iter(items)))
            })
            .flatten();

        Ok(Box::pin(fragments))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Builds the request body. Leading model messages (the persona greeting) are
/// dropped because the API requires the contents to start with a user turn.
fn to_gemini_request(request: &GenerationRequest) -> GeminiRequest {
    let system = PromptBuilder::new(&request.language)
        .with_persona(request.persona.as_ref())
        .with_profile(request.profile.as_ref())
        .build();

    let contents = request
        .history
        .iter()
        .skip_while(|message| message.role() == MessageRole::Model)
        .map(|message| GeminiContent {
            role: match message.role() {
                MessageRole::User => "user",
                MessageRole::Model => "model",
            }
            .to_string(),
            parts: vec![GeminiPart {
                text: message.content().to_string(),
            }],
        })
        .collect();

    GeminiRequest {
        system_instruction: GeminiSystem {
            parts: vec![GeminiPart { text: system }],
        },
        contents,
    }
}

/// Reads the retry delay (`"retryDelay": "12s"`) from an error body.
fn parse_retry_delay(error_body: &str) -> u32 {
    const DEFAULT_RETRY_SECS: u32 = 30;

    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) else {
        return DEFAULT_RETRY_SECS;
    };
    parsed
        .pointer("/error/details")
        .and_then(|details| details.as_array())
        .into_iter()
        .flatten()
        .filter_map(|detail| detail.get("retryDelay").and_then(|d| d.as_str()))
        .filter_map(|delay| delay.trim_end_matches('s').parse::<f64>().ok())
        .map(|secs| secs.ceil() as u32)
        .next()
        .unwrap_or(DEFAULT_RETRY_SECS)
}

/// Line-buffered SSE decoder.
///
/// Holds raw bytes until a newline arrives, so a character split across
/// network chunks is decoded whole.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<Fragment, GenerationError>> {
        self.buffer.extend_from_slice(bytes);

        let mut results = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            if let Some(item) = parse_sse_line(line.trim_end_matches(['\r', '\n'])) {
                results.push(item);
            }
        }
        results
    }
}

fn parse_sse_line(line: &str) -> Option<Result<Fragment, GenerationError>> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() {
        return None;
    }

    let chunk = match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return Some(Err(GenerationError::Parse(format!(
                "Failed to parse SSE chunk: {}",
                e
            ))))
        }
    };

    if let Some(reason) = chunk.prompt_feedback.and_then(|f| f.block_reason) {
        return Some(Err(GenerationError::Blocked(reason)));
    }

    let text: String = chunk
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    (!text.is_empty()).then(|| Ok(Fragment::new(text)))
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiSystem,
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiSystem {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<StreamCandidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct StreamCandidate {
    content: Option<StreamContent>,
}

#[derive(Debug, Deserialize)]
struct StreamContent {
    #[serde(default)]
    parts: Vec<StreamPart>,
}

#[derive(Debug, Deserialize)]
struct StreamPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
