//! Session engine - one query fully resolved at a time.

use crate::context::{ConversationContext, Role};
use crate::error::{Result, VeraError};
use crate::invoker::Invoker;
use crate::router::{Router, Verdict};
use tracing::info;

/// Ties the router, invoker, and conversation context together for one
/// user session. Queries are resolved strictly in sequence; the context
/// is appended only after a turn has produced its final text.
pub struct Session {
    router: Router,
    invoker: Invoker,
    context: ConversationContext,
}

impl Session {
    pub fn new(router: Router, invoker: Invoker) -> Self {
        Self {
            router,
            invoker,
            context: ConversationContext::new(),
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Resolve one user turn to the text shown to the user.
    ///
    /// A failed invocation becomes a readable failure message, not an
    /// error: the session survives every per-turn failure except the
    /// router itself having no strategy left to consult.
    pub async fn respond(&mut self, query: &str) -> Result<String> {
        let decision = self.router.decide(query, &self.context).await?;
        info!("Turn resolved via: {}", decision.rationale);

        let reply = match decision.verdict {
            Verdict::Model(path) => match self.invoker.run(&path).await {
                Ok(output) => output,
                Err(VeraError::Execution { path, stderr }) => {
                    format!("Error running the model at {path}: {stderr}")
                }
                Err(e) => format!("Error running the model: {e}"),
            },
            Verdict::Reply(text) => text,
            Verdict::NoMatch => "No matching model found.".to_string(),
        };

        self.context.push(Role::User, query);
        self.context.push(Role::Assistant, reply.clone());
        Ok(reply)
    }

    /// End the session's history.
    pub fn reset(&mut self) {
        self.context.clear();
    }
}
