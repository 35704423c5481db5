//! Vera configuration.
//!
//! TOML file with per-field defaults; a missing file yields the defaults,
//! a malformed one is an error. `VERA_OLLAMA_URL` overrides the service
//! URL for both chat and embeddings.

use crate::error::{Result, VeraError};
use crate::router::RouterMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VeraConfig {
    /// Catalog JSON file (`{"models": [...]}`).
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    #[serde(default)]
    pub mode: RouterMode,

    #[serde(default)]
    pub ollama: OllamaSettings,

    #[serde(default)]
    pub invoker: InvokerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    #[serde(default = "default_embed_dimension")]
    pub embed_dimension: usize,

    #[serde(default = "default_chat_timeout")]
    pub chat_timeout_secs: u64,

    #[serde(default = "default_embed_timeout")]
    pub embed_timeout_secs: u64,

    /// How long the model stays loaded after a request (e.g. "5m").
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokerSettings {
    /// Fixed interpreter the catalog artifacts are run with.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    #[serde(default = "default_invoker_timeout")]
    pub timeout_secs: u64,
}

fn default_catalog_path() -> String {
    "models.json".to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_chat_model() -> String {
    "qwen3:4b".to_string()
}

fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embed_dimension() -> usize {
    768
}

fn default_chat_timeout() -> u64 {
    30
}

fn default_embed_timeout() -> u64 {
    10
}

fn default_keep_alive() -> String {
    "5m".to_string()
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_invoker_timeout() -> u64 {
    8
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embed_model: default_embed_model(),
            embed_dimension: default_embed_dimension(),
            chat_timeout_secs: default_chat_timeout(),
            embed_timeout_secs: default_embed_timeout(),
            keep_alive: default_keep_alive(),
        }
    }
}

impl Default for InvokerSettings {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            timeout_secs: default_invoker_timeout(),
        }
    }
}

impl Default for VeraConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            mode: RouterMode::default(),
            ollama: OllamaSettings::default(),
            invoker: InvokerSettings::default(),
        }
    }
}

impl VeraConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw)
                .map_err(|e| VeraError::Config(format!("{}: {e}", path.display())))?
        } else {
            info!("No config at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(url) = std::env::var("VERA_OLLAMA_URL") {
            if !url.is_empty() {
                config.ollama.base_url = url;
            }
        }

        Ok(config)
    }
}
