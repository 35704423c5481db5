//! Vera - routes free-text queries to runnable models from a static catalog.
//!
//! Strategies (keyword, embedding, judgment, random) independently propose
//! a catalog entry; the router reconciles them, the invoker executes the
//! winner out-of-process, and the conversation context carries prior turns
//! into the judgment strategy for multi-turn disambiguation.

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod invoker;
pub mod ollama;
pub mod router;
pub mod session;
pub mod strategy;

pub use catalog::{Catalog, CatalogEntry};
pub use config::VeraConfig;
pub use context::{ConversationContext, Role, Turn};
pub use error::{Result, VeraError};
pub use invoker::Invoker;
pub use ollama::{ChatBackend, ChatMessage, EmbeddingBackend, HashEmbedder, OllamaChat, OllamaEmbedder};
pub use router::{Router, RouterDecision, RouterMode, Verdict};
pub use session::Session;
pub use strategy::{
    Decision, EmbeddingStrategy, Judgment, JudgmentStrategy, KeywordStrategy, RandomStrategy,
};
