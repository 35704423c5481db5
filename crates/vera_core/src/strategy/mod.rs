//! Selection strategies.
//!
//! Each strategy independently proposes a routing decision from a query.
//! They share only read-only state (the catalog, cached entry embeddings)
//! and never observe each other; the router reconciles their proposals.

pub mod embedding;
pub mod judgment;
pub mod keyword;
pub mod random;

pub use embedding::EmbeddingStrategy;
pub use judgment::JudgmentStrategy;
pub use keyword::KeywordStrategy;
pub use random::RandomStrategy;

/// A strategy's proposal: one catalog path, or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Model(String),
    NoMatch,
}

/// The judgment strategy's richer outcome: a catalog path, or a direct
/// conversational answer that must reach the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Judgment {
    Model(String),
    Reply(String),
}
