//! Judgment strategy - delegates the decision to a generative model.

use crate::catalog::Catalog;
use crate::context::ConversationContext;
use crate::error::{Result, VeraError};
use crate::ollama::{ChatBackend, ChatMessage};
use crate::strategy::Judgment;
use std::sync::Arc;
use tracing::debug;

/// Relative-executable marker: a response starting with this is treated as
/// a path nomination even when it is not (yet) validated against the
/// catalog. Validation happens in the router.
const PATH_PREFIX: &str = "./";

/// Asks a chat model to pick a catalog path, seeded with the serialized
/// catalog and a strict answering policy. The response is untrusted text:
/// it is classified here and validated against the catalog by the router,
/// never executed directly.
pub struct JudgmentStrategy {
    backend: Arc<dyn ChatBackend>,
    catalog: Arc<Catalog>,
    system_prompt: String,
}

impl JudgmentStrategy {
    pub fn new(catalog: Arc<Catalog>, backend: Arc<dyn ChatBackend>) -> Result<Self> {
        let system_prompt = build_system_prompt(&catalog)?;
        Ok(Self {
            backend,
            catalog,
            system_prompt,
        })
    }

    /// Run one judgment over the query plus prior session turns.
    ///
    /// A transport failure is surfaced as a strategy-level error, never
    /// silently converted to a no-match.
    pub async fn select(&self, query: &str, context: &ConversationContext) -> Result<Judgment> {
        let mut messages: Vec<ChatMessage> = context
            .turns()
            .iter()
            .map(|turn| ChatMessage {
                role: turn.role.as_str().to_string(),
                content: turn.text.clone(),
            })
            .collect();
        messages.push(ChatMessage::user(query));

        let raw = self
            .backend
            .complete(&self.system_prompt, &messages)
            .await
            .map_err(|e| VeraError::ExternalService {
                strategy: "judgment",
                reason: match e {
                    VeraError::ExternalService { reason, .. } => reason,
                    other => other.to_string(),
                },
            })?;

        Ok(self.classify(&raw))
    }

    /// A response that is exactly a catalog path, or that begins with the
    /// relative-executable marker, nominates a model. Anything else is a
    /// direct conversational answer and must reach the user verbatim.
    fn classify(&self, raw: &str) -> Judgment {
        let trimmed = raw.trim();
        if self.catalog.contains_path(trimmed) || trimmed.starts_with(PATH_PREFIX) {
            debug!("Judgment nominated path: {}", trimmed);
            Judgment::Model(trimmed.to_string())
        } else {
            debug!("Judgment replied in dialogue ({} chars)", trimmed.len());
            Judgment::Reply(trimmed.to_string())
        }
    }
}

fn build_system_prompt(catalog: &Catalog) -> Result<String> {
    let metadata = catalog.to_json()?;
    Ok(format!(
        "You are a helpful assistant that helps users choose models by printing the model path. \
You have the following models metadata: {metadata}\n\
Your goal is to assist the user in finding the correct model path based on their query.\n\
If the user's query clearly matches a single model's description or tags, answer with exactly \
that model path and nothing else.\n\
If the query is related to several models but too vague, list the candidate model paths and \
ask a follow-up question to determine the specific issue.\n\
If the user confirms a specific model-related issue, immediately provide the model path \
without any additional explanation, context, or sentences. Only print the model path.\n\
If the query is completely unrelated to any model, answer as you normally would."
    ))
}
