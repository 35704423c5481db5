//! Model catalog - the static set of runnable candidates.
//!
//! Loaded once at startup from a JSON file with a top-level `models`
//! sequence. Entries are immutable for the lifetime of the process;
//! strategies hold the catalog behind an `Arc` and never mutate it.

use crate::error::{Result, VeraError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One selectable candidate: a runnable artifact plus descriptive metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Path of the executable artifact. Never shell-interpreted; only ever
    /// passed as a single argument to a fixed interpreter.
    #[serde(rename = "model_path")]
    pub path: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CatalogEntry {
    /// Text the embedding strategy indexes for this entry.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.description, self.tags.join(" "))
    }
}

/// On-disk catalog shape: `{ "models": [ ... ] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    models: Vec<CatalogEntry>,
}

/// Immutable catalog of candidate models.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load and validate the catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&raw)?;
        let catalog = Self::from_entries(file.models)?;
        info!(
            "Loaded catalog with {} models from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Build a catalog from already-parsed entries.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(VeraError::Catalog("catalog has no models".to_string()));
        }
        for entry in &entries {
            if entry.path.trim().is_empty() {
                return Err(VeraError::Catalog(format!(
                    "model '{}' has an empty path",
                    entry.description
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Byte-for-byte membership test. The invoker refuses any path that
    /// fails this check, so untrusted text can never name an executable.
    pub fn contains_path(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    pub fn get(&self, path: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Serialize the catalog in its wire shape, for the judgment prompt.
    pub fn to_json(&self) -> Result<String> {
        let file = CatalogFile {
            models: self.entries.clone(),
        };
        Ok(serde_json::to_string(&file)?)
    }
}
