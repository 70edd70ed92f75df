//! Ollama wire client: health probe and single-page transcription.
//!
//! All wire-protocol concerns live here so the pipeline never sees HTTP.
//! One request per page, no retries — retry policy belongs to callers that
//! want it, not to the transport layer.
//!
//! The [`Transcriber`] trait is the seam between the pipeline and the model
//! service: [`OllamaClient`] is the production implementation, and tests
//! inject scripted implementations to exercise ordering and failure-isolation
//! behaviour without a live server.

use crate::config::RunConfig;
use crate::error::{PageFailure, Pdf2TextError};
use crate::prompts::TRANSCRIPTION_PROMPT;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A service that turns one page image into text.
///
/// `ready` gates the run before any rendering work starts; `transcribe`
/// performs one page's call. Implementations must be `Send + Sync` so the
/// pipeline can hold them across await points.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Cheap reachability probe. Never errors — unreachable is just `false`.
    async fn ready(&self) -> bool;

    /// Transcribe one page image with the given model.
    async fn transcribe(&self, image: &[u8], model: &str) -> Result<String, PageFailure>;
}

/// HTTP client for the Ollama generate API.
pub struct OllamaClient {
    base_url: String,
    http: reqwest::Client,
    stream: bool,
    timeout_secs: u64,
    health_timeout_secs: u64,
}

impl OllamaClient {
    /// Create a client for the given endpoint with a per-call timeout.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, Pdf2TextError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Pdf2TextError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            stream: false,
            timeout_secs,
            health_timeout_secs: 5,
        })
    }

    /// Create a client matching a [`RunConfig`].
    pub fn from_config(config: &RunConfig) -> Result<Self, Pdf2TextError> {
        let mut client = Self::new(&config.base_url, config.api_timeout_secs)?;
        client.stream = config.stream;
        client.health_timeout_secs = config.health_timeout_secs.max(1);
        Ok(client)
    }

    fn map_transport(&self, e: reqwest::Error) -> PageFailure {
        if e.is_timeout() {
            PageFailure::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            PageFailure::Transport {
                detail: e.to_string(),
            }
        }
    }

    /// Read an NDJSON response stream, returning the terminal chunk's text.
    ///
    /// Only the `done: true` chunk is authoritative; intermediate chunks are
    /// inspected solely for an `error` field, which fails the page
    /// immediately instead of being buffered.
    async fn read_stream(&self, resp: reqwest::Response) -> Result<String, PageFailure> {
        let status = resp.status().as_u16();
        let mut body = resp.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| self.map_transport(e))?;
            buf.extend_from_slice(&chunk);

            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                if let Some(text) = handle_chunk(&line, status)? {
                    return Ok(text);
                }
            }
        }

        // A terminal chunk without a trailing newline is still a chunk.
        if let Some(text) = handle_chunk(&buf, status)? {
            return Ok(text);
        }

        Err(PageFailure::Protocol {
            detail: "stream ended without a terminal chunk".into(),
        })
    }
}

#[async_trait]
impl Transcriber for OllamaClient {
    async fn ready(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);
        let resp = match self
            .http
            .get(&url)
            .timeout(Duration::from_secs(self.health_timeout_secs))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                debug!("health probe failed: {e}");
                return false;
            }
        };

        if !resp.status().is_success() {
            debug!("health probe returned status {}", resp.status());
            return false;
        }

        match resp.json::<VersionResponse>().await {
            Ok(v) => v.version.map(|s| !s.is_empty()).unwrap_or(false),
            Err(e) => {
                debug!("health probe body unreadable: {e}");
                false
            }
        }
    }

    async fn transcribe(&self, image: &[u8], model: &str) -> Result<String, PageFailure> {
        let payload = GenerateRequest {
            model,
            prompt: TRANSCRIPTION_PROMPT,
            stream: self.stream,
            images: vec![STANDARD.encode(image)],
        };
        debug!(
            model,
            stream = self.stream,
            image_b64_len = payload.images[0].len(),
            "sending generate request"
        );

        let resp = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "generate request rejected");
            return Err(PageFailure::Service {
                status: status.as_u16(),
                body,
            });
        }

        if self.stream {
            self.read_stream(resp).await
        } else {
            let body = resp.text().await.map_err(|e| self.map_transport(e))?;
            let parsed: GenerateResponse =
                serde_json::from_str(&body).map_err(|e| PageFailure::Protocol {
                    detail: e.to_string(),
                })?;
            Ok(parsed.response)
        }
    }
}

/// Parse one NDJSON line of a streamed generate response.
///
/// Returns `Ok(Some(text))` for the terminal chunk, `Ok(None)` for blank
/// lines and non-terminal chunks, and `Err` for error chunks or garbage.
fn handle_chunk(line: &[u8], status: u16) -> Result<Option<String>, PageFailure> {
    let line = std::str::from_utf8(line)
        .map_err(|e| PageFailure::Protocol {
            detail: format!("non-UTF-8 stream chunk: {e}"),
        })?
        .trim();
    if line.is_empty() {
        return Ok(None);
    }

    let chunk: GenerateChunk = serde_json::from_str(line).map_err(|e| PageFailure::Protocol {
        detail: format!("unparseable stream chunk: {e}"),
    })?;

    if let Some(error) = chunk.error {
        return Err(PageFailure::Service {
            status,
            body: error,
        });
    }
    if chunk.done {
        return Ok(Some(chunk.response.unwrap_or_default()));
    }
    Ok(None)
}

// ── Wire types ───────────────────────────────────────────────────────────

/// Request body for `POST /api/generate`.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    images: Vec<String>,
}

/// Non-streaming response body: only the completion field matters.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// One NDJSON chunk of a streamed response.
#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Response body for `GET /api/version`.
#[derive(Debug, Deserialize)]
struct VersionResponse {
    #[serde(default)]
    version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generate_request_wire_shape() {
        let req = GenerateRequest {
            model: "qwen2.5vl:latest",
            prompt: TRANSCRIPTION_PROMPT,
            stream: false,
            images: vec![STANDARD.encode(b"png-bytes")],
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "qwen2.5vl:latest");
        assert_eq!(v["stream"], false);
        assert_eq!(v["images"].as_array().unwrap().len(), 1);
        assert!(v["prompt"].as_str().unwrap().contains("Transcribe"));
        // images must be valid base64 of the original bytes
        let decoded = STANDARD
            .decode(v["images"][0].as_str().unwrap())
            .unwrap();
        assert_eq!(decoded, b"png-bytes");
    }

    #[test]
    fn non_terminal_chunk_is_skipped() {
        let line = json!({"response": "partial", "done": false}).to_string();
        assert_eq!(handle_chunk(line.as_bytes(), 200).unwrap(), None);
    }

    #[test]
    fn terminal_chunk_text_is_authoritative() {
        let line = json!({"response": "full text", "done": true}).to_string();
        assert_eq!(
            handle_chunk(line.as_bytes(), 200).unwrap(),
            Some("full text".to_string())
        );
    }

    #[test]
    fn error_chunk_fails_immediately() {
        let line = json!({"error": "model exploded"}).to_string();
        let err = handle_chunk(line.as_bytes(), 200).unwrap_err();
        match err {
            PageFailure::Service { status, body } => {
                assert_eq!(status, 200);
                assert_eq!(body, "model exploded");
            }
            other => panic!("expected Service failure, got {other:?}"),
        }
    }

    #[test]
    fn garbage_chunk_is_a_protocol_failure() {
        let err = handle_chunk(b"{not json", 200).unwrap_err();
        assert!(matches!(err, PageFailure::Protocol { .. }));
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(handle_chunk(b"  \n", 200).unwrap(), None);
        assert_eq!(handle_chunk(b"", 200).unwrap(), None);
    }
}
