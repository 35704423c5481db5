//! Embedding strategy - cosine similarity over cached entry vectors.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::ollama::EmbeddingBackend;
use crate::strategy::Decision;
use std::sync::Arc;
use tracing::debug;

/// Normalized dot-product similarity, range [-1, 1]. Zero if either vector
/// has no magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

fn is_degenerate(vector: &[f32]) -> bool {
    vector.is_empty()
        || vector.iter().any(|x| !x.is_finite())
        || vector.iter().all(|x| *x == 0.0)
}

/// Vector-similarity match between the query and each entry's
/// description + tags.
///
/// Entry vectors are computed once at construction and reused for every
/// query; re-encoding the catalog per query would be correct but wasteful.
pub struct EmbeddingStrategy {
    backend: Arc<dyn EmbeddingBackend>,
    /// (path, vector) per catalog entry, in catalog order.
    cached: Vec<(String, Vec<f32>)>,
}

impl EmbeddingStrategy {
    /// Embed every catalog entry up front. Runs before any query-time
    /// concurrency begins; the cache is read-only afterwards.
    pub async fn new(catalog: &Catalog, backend: Arc<dyn EmbeddingBackend>) -> Result<Self> {
        let mut cached = Vec::with_capacity(catalog.len());
        for entry in catalog.entries() {
            let vector = backend.embed(&entry.embedding_text()).await?;
            cached.push((entry.path.clone(), vector));
        }
        debug!("Cached {} entry embeddings", cached.len());
        Ok(Self { backend, cached })
    }

    /// Nominate the entry with the strictly highest similarity. Ties keep
    /// the earlier catalog entry (`>`, not `>=`). There is no similarity
    /// threshold: any non-degenerate query nominates some entry, because
    /// a poor best match is not detectable from similarity alone.
    pub async fn select(&self, query: &str) -> Result<Decision> {
        if query.trim().is_empty() {
            return Ok(Decision::NoMatch);
        }

        let query_vector = self.backend.embed(query).await?;

        if is_degenerate(&query_vector) {
            debug!("Query encoded to a degenerate vector; similarity undefined");
            return Ok(Decision::NoMatch);
        }

        let mut best_similarity = f32::NEG_INFINITY;
        let mut best_path: Option<&str> = None;
        for (path, vector) in &self.cached {
            let similarity = cosine_similarity(&query_vector, vector);
            if similarity > best_similarity {
                best_similarity = similarity;
                best_path = Some(path);
            }
        }

        match best_path {
            Some(path) => {
                debug!("Best embedding match {} ({:.4})", path, best_similarity);
                Ok(Decision::Model(path.to_string()))
            }
            None => Ok(Decision::NoMatch),
        }
    }
}
