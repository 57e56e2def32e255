//! HTTP clients for OpenAI-compatible chat-completion and speech endpoints.

use async_trait::async_trait;
use futures::StreamExt;
use pakkibl_core::{ChatMessage, Role};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ConfigError, LlmConfig, SpeechConfig};
use crate::provider::{GenerateError, Generator, SpeechError, Synthesizer};

// ── Wire types ──

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

// ── Error mapping ──

/// Map a non-success HTTP status to the error taxonomy.
fn status_error(status: u16, body: &str) -> GenerateError {
    // Prefer the provider's own message over the raw body.
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        401 | 403 => GenerateError::Authentication(detail),
        429 => GenerateError::RateLimited(detail),
        _ => GenerateError::Other(format!("server returned {status}: {detail}")),
    }
}

fn transport_error(err: &reqwest::Error) -> GenerateError {
    if err.is_connect() || err.is_timeout() {
        GenerateError::Connection(err.to_string())
    } else {
        GenerateError::Other(err.to_string())
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GenerateError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let err = status_error(status.as_u16(), &body);
    warn!(status = status.as_u16(), error = %err, "provider returned an error");
    Err(err)
}

// ── Server-sent events ──

#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Delta(String),
    Done,
}

/// Longest event line accepted before the stream is treated as malformed.
const MAX_SSE_LINE: usize = 1 << 20;

/// Incremental decoder for `text/event-stream` completion bodies.
///
/// Bytes are buffered until a full line is available, so multi-byte
/// characters split across network chunks decode correctly.
#[derive(Default)]
struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, GenerateError> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(event) = decode_line(&line)? {
                events.push(event);
            }
        }
        if self.buf.len() > MAX_SSE_LINE {
            return Err(GenerateError::Other(format!(
                "stream line exceeds {MAX_SSE_LINE} bytes"
            )));
        }
        Ok(events)
    }

    /// Decode whatever is left once the body ends without a newline.
    fn finish(&mut self) -> Result<Option<SseEvent>, GenerateError> {
        let rest = std::mem::take(&mut self.buf);
        decode_line(&rest)
    }
}

fn decode_line(line: &[u8]) -> Result<Option<SseEvent>, GenerateError> {
    let line = String::from_utf8_lossy(line);
    parse_sse_line(line.trim_end())
}

fn parse_sse_line(line: &str) -> Result<Option<SseEvent>, GenerateError> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }
    if data == "[DONE]" {
        return Ok(Some(SseEvent::Done));
    }

    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| GenerateError::Other(format!("malformed stream chunk: {e}")))?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|s| !s.is_empty())
        .map(SseEvent::Delta))
}

// ── Chat completions ──

/// Client for `POST /v1/chat/completions`.
pub struct OpenAiClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url)
    }

    fn request<'a>(
        &'a self,
        prompt: &'a str,
        context: &'a [ChatMessage],
        stream: bool,
    ) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(context.len() + 1);
        messages.push(WireMessage {
            role: Role::System.as_str(),
            content: prompt,
        });
        messages.extend(context.iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));

        ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream,
        }
    }

    async fn send(&self, body: &ChatRequest<'_>) -> Result<reqwest::Response, GenerateError> {
        let url = self.url();
        info!(
            url = %url,
            model = %self.config.model,
            messages = body.messages.len(),
            stream = body.stream,
            "requesting completion"
        );
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        check_status(resp).await
    }
}

#[async_trait]
impl Generator for OpenAiClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        prompt: &str,
        context: &[ChatMessage],
    ) -> Result<String, GenerateError> {
        let resp = self.send(&self.request(prompt, context, false)).await?;
        let parsed: ChatResponse = resp.json().await.map_err(|e| transport_error(&e))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        info!(chars = text.len(), "completion received");
        Ok(text)
    }

    async fn generate_streaming(
        &self,
        prompt: &str,
        context: &[ChatMessage],
        on_delta: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<String, GenerateError> {
        let resp = self.send(&self.request(prompt, context, true)).await?;

        let mut stream = resp.bytes_stream();
        let mut decoder = SseDecoder::default();
        let mut full = String::new();

        let mut done = false;
        'outer: while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| transport_error(&e))?;
            for event in decoder.push(&chunk)? {
                match event {
                    SseEvent::Delta(text) => {
                        on_delta(&text);
                        full.push_str(&text);
                    }
                    SseEvent::Done => {
                        done = true;
                        break 'outer;
                    }
                }
            }
        }
        if !done {
            if let Some(SseEvent::Delta(text)) = decoder.finish()? {
                on_delta(&text);
                full.push_str(&text);
            }
        }

        info!(chars = full.len(), "completion streamed");
        Ok(full)
    }
}

// ── Speech ──

/// Client for `POST /v1/audio/speech`. Returns MP3 bytes.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl OpenAiSpeech {
    pub fn new(config: SpeechConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1/audio/speech", self.config.base_url)
    }
}

#[async_trait]
impl Synthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let url = self.url();
        info!(url = %url, voice = %self.config.voice, chars = text.len(), "requesting speech");

        let body = SpeechRequest {
            model: &self.config.model,
            input: text,
            voice: &self.config.voice,
            response_format: "mp3",
        };
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        let resp = check_status(resp).await?;

        let audio = resp.bytes().await.map_err(|e| transport_error(&e))?;
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        info!(bytes = audio.len(), "speech received");
        Ok(audio.to_vec())
    }
}
