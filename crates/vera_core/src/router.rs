//! Router - reconciles strategy proposals into one final decision.
//!
//! In hybrid mode the judgment and embedding strategies run independently
//! and a deterministic policy resolves disagreement: agreement returns the
//! shared path, disagreement lets judgment win (embedding similarity is a
//! corroborating signal only), and a conversational judgment reply is
//! always final. A judgment path that is not in the catalog is treated as
//! a hallucination and falls back to the embedding nomination.

use crate::catalog::Catalog;
use crate::context::ConversationContext;
use crate::error::{Result, VeraError};
use crate::ollama::{ChatBackend, EmbeddingBackend};
use crate::strategy::{
    Decision, EmbeddingStrategy, Judgment, JudgmentStrategy, KeywordStrategy,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Which strategies the router consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterMode {
    Keyword,
    Embedding,
    Judgment,
    #[default]
    Hybrid,
}

/// The router's final word on a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Execute this catalog entry.
    Model(String),
    /// Hand this text to the user verbatim.
    Reply(String),
    /// Nothing matched and no conversational answer was produced.
    NoMatch,
}

/// Verdict plus which rule produced it (confidence-free rationale).
#[derive(Debug, Clone)]
pub struct RouterDecision {
    pub verdict: Verdict,
    pub rationale: &'static str,
}

impl RouterDecision {
    fn model(path: String, rationale: &'static str) -> Self {
        Self {
            verdict: Verdict::Model(path),
            rationale,
        }
    }

    fn reply(text: String, rationale: &'static str) -> Self {
        Self {
            verdict: Verdict::Reply(text),
            rationale,
        }
    }

    fn no_match(rationale: &'static str) -> Self {
        Self {
            verdict: Verdict::NoMatch,
            rationale,
        }
    }
}

enum Engine {
    Keyword(KeywordStrategy),
    Embedding(EmbeddingStrategy),
    Judgment(JudgmentStrategy),
    Hybrid {
        embedding: EmbeddingStrategy,
        judgment: JudgmentStrategy,
    },
}

pub struct Router {
    catalog: Arc<Catalog>,
    engine: Engine,
}

impl Router {
    /// Build the strategies the mode needs. Entry embeddings are computed
    /// here, once, before any query is accepted.
    pub async fn new(
        catalog: Arc<Catalog>,
        mode: RouterMode,
        chat: Arc<dyn ChatBackend>,
        embedder: Arc<dyn EmbeddingBackend>,
    ) -> Result<Self> {
        let engine = match mode {
            RouterMode::Keyword => Engine::Keyword(KeywordStrategy::new(&catalog)?),
            RouterMode::Embedding => {
                Engine::Embedding(EmbeddingStrategy::new(&catalog, embedder).await?)
            }
            RouterMode::Judgment => {
                Engine::Judgment(JudgmentStrategy::new(catalog.clone(), chat)?)
            }
            RouterMode::Hybrid => Engine::Hybrid {
                embedding: EmbeddingStrategy::new(&catalog, embedder).await?,
                judgment: JudgmentStrategy::new(catalog.clone(), chat)?,
            },
        };
        Ok(Self { catalog, engine })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolve one query to a final decision.
    ///
    /// In hybrid mode a single strategy failing does not abort the turn;
    /// only both failing does.
    pub async fn decide(
        &self,
        query: &str,
        context: &ConversationContext,
    ) -> Result<RouterDecision> {
        let decision = match &self.engine {
            Engine::Keyword(strategy) => match strategy.select(query) {
                Decision::Model(path) => RouterDecision::model(path, "keyword match"),
                Decision::NoMatch => RouterDecision::no_match("no keyword matched"),
            },
            Engine::Embedding(strategy) => match strategy.select(query).await? {
                Decision::Model(path) => RouterDecision::model(path, "embedding similarity"),
                Decision::NoMatch => RouterDecision::no_match("embedding abstained"),
            },
            Engine::Judgment(strategy) => {
                match strategy.select(query, context).await? {
                    Judgment::Model(path) if self.catalog.contains_path(&path) => {
                        RouterDecision::model(path, "judgment")
                    }
                    Judgment::Model(path) => {
                        warn!("Judgment nominated a path not in the catalog: {}", path);
                        RouterDecision::no_match("judgment nominated an unknown path")
                    }
                    Judgment::Reply(text) => {
                        RouterDecision::reply(text, "judgment replied in dialogue")
                    }
                }
            }
            Engine::Hybrid {
                embedding,
                judgment,
            } => {
                self.decide_hybrid(query, context, embedding, judgment)
                    .await?
            }
        };

        info!("Decision: {:?} ({})", decision.verdict, decision.rationale);
        Ok(decision)
    }

    async fn decide_hybrid(
        &self,
        query: &str,
        context: &ConversationContext,
        embedding: &EmbeddingStrategy,
        judgment: &JudgmentStrategy,
    ) -> Result<RouterDecision> {
        // Independent strategies over read-only state: safe to run together.
        let (embedding_result, judgment_result) =
            tokio::join!(embedding.select(query), judgment.select(query, context));

        // One strategy failing must not take the other down with it.
        let nominated = match embedding_result {
            Ok(decision) => Some(decision),
            Err(e) => {
                warn!("Embedding strategy failed, judgment decides alone: {}", e);
                None
            }
        };
        let judged = match judgment_result {
            Ok(judgment) => Some(judgment),
            Err(e) => {
                warn!("Judgment strategy failed, falling back to embedding: {}", e);
                None
            }
        };

        let decision = match (judged, nominated) {
            (None, None) => {
                return Err(VeraError::ExternalService {
                    strategy: "hybrid",
                    reason: "judgment and embedding are both unavailable".to_string(),
                })
            }
            (None, Some(Decision::Model(path))) => {
                RouterDecision::model(path, "embedding similarity (judgment unavailable)")
            }
            (None, Some(Decision::NoMatch)) => {
                RouterDecision::no_match("judgment unavailable and embedding abstained")
            }
            // A direct conversational answer is final; routing strategies
            // never override it.
            (Some(Judgment::Reply(text)), _) => {
                RouterDecision::reply(text, "judgment replied in dialogue")
            }
            (Some(Judgment::Model(path)), nominated) if self.catalog.contains_path(&path) => {
                match nominated {
                    Some(Decision::Model(other)) if other == path => {
                        RouterDecision::model(path, "judgment and embedding agree")
                    }
                    Some(Decision::Model(other)) => {
                        // Deterministic asymmetric tie-break, logged as an
                        // ambiguous match rather than surfaced as an error.
                        warn!(
                            "Ambiguous match: judgment={} embedding={}; judgment wins",
                            path, other
                        );
                        RouterDecision::model(path, "judgment overrides embedding")
                    }
                    _ => RouterDecision::model(path, "judgment"),
                }
            }
            (Some(Judgment::Model(path)), nominated) => {
                warn!("Judgment nominated a path not in the catalog: {}", path);
                match nominated {
                    Some(Decision::Model(other)) => RouterDecision::model(
                        other,
                        "embedding similarity (judgment nominated an unknown path)",
                    ),
                    _ => RouterDecision::no_match("judgment nominated an unknown path"),
                }
            }
        };
        Ok(decision)
    }
}
