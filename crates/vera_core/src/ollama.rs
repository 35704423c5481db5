//! Chat and embedding backends.
//!
//! Both external services are modeled as traits so the router logic stays
//! independent of any vendor: production implementations talk to a local
//! Ollama server, tests use deterministic stand-ins. The `HashEmbedder` is
//! the offline fallback when no embedding service is configured.

use crate::error::{Result, VeraError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// One chat message on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Text-generation service boundary.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one completion over a system prompt plus prior messages and
    /// return the raw response text. The caller treats it as untrusted.
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String>;
}

/// Embedding service boundary. Encoding must be a pure function of the
/// input text for a fixed backend instance.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn dimension(&self) -> usize;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Chat client for a local Ollama server (`/api/chat`, non-streaming).
pub struct OllamaChat {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    /// How long the model stays loaded after a request (e.g. "5m").
    keep_alive: String,
}

impl OllamaChat {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VeraError::ExternalService {
                strategy: "chat",
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            keep_alive: "5m".to_string(),
        })
    }

    pub fn with_keep_alive(mut self, keep_alive: &str) -> Self {
        self.keep_alive = keep_alive.to_string();
        self
    }
}

#[async_trait]
impl ChatBackend for OllamaChat {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let mut wire = Vec::with_capacity(messages.len() + 1);
        wire.push(ChatMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
        wire.extend_from_slice(messages);

        let request = ChatRequest {
            model: &self.model,
            messages: wire,
            stream: false,
            keep_alive: Some(&self.keep_alive),
        };

        info!("[>]  chat call [{}] ({} messages)", self.model, messages.len());

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| VeraError::ExternalService {
                strategy: "chat",
                reason: format!("request to Ollama failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(VeraError::ExternalService {
                strategy: "chat",
                reason: format!("Ollama returned {}", response.status()),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| VeraError::ExternalService {
                    strategy: "chat",
                    reason: format!("invalid Ollama response: {e}"),
                })?;

        debug!("[<]  chat response ({} chars)", parsed.message.content.len());
        Ok(parsed.message.content)
    }
}

/// Embedding client for a local Ollama server (`/api/embed`).
pub struct OllamaEmbedder {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str, dimension: usize, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VeraError::ExternalService {
                strategy: "embedding",
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimension,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            input: vec![text],
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| VeraError::ExternalService {
                strategy: "embedding",
                reason: format!("request to Ollama failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(VeraError::ExternalService {
                strategy: "embedding",
                reason: format!("Ollama returned {}", response.status()),
            });
        }

        let parsed: EmbedResponse =
            response
                .json()
                .await
                .map_err(|e| VeraError::ExternalService {
                    strategy: "embedding",
                    reason: format!("invalid Ollama response: {e}"),
                })?;

        parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| VeraError::ExternalService {
                strategy: "embedding",
                reason: "empty embeddings array in Ollama response".to_string(),
            })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Deterministic offline embedder: hashes lowercase word tokens into a
/// fixed number of buckets and L2-normalizes. Same text always encodes to
/// the same vector; texts sharing words land in shared buckets.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

fn fnv1a(token: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl EmbeddingBackend for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = (fnv1a(token) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[tokio::test]
    async fn hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("predicts diabetes risk").await.unwrap();
        let b = embedder.embed("predicts diabetes risk").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn hash_embedder_normalizes_nonempty_text() {
        let embedder = HashEmbedder::new(64);
        let v = embedder.embed("diabetes glucose insulin").await.unwrap();
        let magnitude: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert_relative_eq!(magnitude, 1.0, epsilon = 1e-5);
    }

    #[tokio::test]
    async fn hash_embedder_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(64);
        let v = embedder.embed("").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn hash_embedder_is_case_insensitive() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("Diabetes Risk").await.unwrap();
        let b = embedder.embed("diabetes risk").await.unwrap();
        assert_eq!(a, b);
    }
}
