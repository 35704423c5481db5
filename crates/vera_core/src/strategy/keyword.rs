//! Keyword strategy - exact whole-word match against declared keywords.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::strategy::Decision;
use regex::Regex;

/// Case-folded keyword lookup built once at catalog load.
///
/// Duplicate keywords across entries resolve to the first entry in catalog
/// order; later declarations are silently ignored. That is the documented
/// policy, not an error.
pub struct KeywordStrategy {
    /// (keyword, owning path, compiled whole-word pattern) in declaration
    /// order. A Vec, not a map: query-time iteration order must match
    /// catalog order for first-wins semantics to be deterministic.
    entries: Vec<(String, String, Regex)>,
}

impl KeywordStrategy {
    pub fn new(catalog: &Catalog) -> Result<Self> {
        let mut entries: Vec<(String, String, Regex)> = Vec::new();
        for model in catalog.entries() {
            for keyword in &model.keywords {
                let folded = keyword.to_lowercase();
                if entries.iter().any(|(k, _, _)| *k == folded) {
                    continue;
                }
                let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&folded)))
                    .map_err(|e| crate::error::VeraError::Catalog(format!(
                        "keyword '{folded}' is not matchable: {e}"
                    )))?;
                entries.push((folded, model.path.clone(), pattern));
            }
        }
        Ok(Self { entries })
    }

    /// First keyword (in catalog order) found whole-word in the query wins.
    pub fn select(&self, query: &str) -> Decision {
        if query.trim().is_empty() {
            return Decision::NoMatch;
        }
        let folded = query.to_lowercase();
        for (_, path, pattern) in &self.entries {
            if pattern.is_match(&folded) {
                return Decision::Model(path.clone());
            }
        }
        Decision::NoMatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;

    fn entry(path: &str, keywords: &[&str]) -> CatalogEntry {
        CatalogEntry {
            path: path.to_string(),
            description: "test model".to_string(),
            tags: vec![],
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn strategy(entries: Vec<CatalogEntry>) -> KeywordStrategy {
        KeywordStrategy::new(&Catalog::from_entries(entries).unwrap()).unwrap()
    }

    #[test]
    fn matching_keyword_selects_owner() {
        let s = strategy(vec![entry("./models/diabetes/predict.py", &["diabetes", "glucose"])]);
        assert_eq!(
            s.select("Could this patient have diabetes?"),
            Decision::Model("./models/diabetes/predict.py".to_string())
        );
    }

    #[test]
    fn selection_is_deterministic() {
        let s = strategy(vec![
            entry("./a.py", &["fever"]),
            entry("./b.py", &["cough"]),
        ]);
        let first = s.select("fever and cough");
        for _ in 0..10 {
            assert_eq!(s.select("fever and cough"), first);
        }
    }

    #[test]
    fn duplicate_keyword_resolves_to_first_entry() {
        let s = strategy(vec![
            entry("./first.py", &["fever"]),
            entry("./second.py", &["fever"]),
        ]);
        assert_eq!(
            s.select("patient has a fever"),
            Decision::Model("./first.py".to_string())
        );
    }

    #[test]
    fn partial_word_does_not_match() {
        let s = strategy(vec![entry("./a.py", &["flu"])]);
        assert_eq!(s.select("fluent speaker"), Decision::NoMatch);
        assert_eq!(s.select("caught the flu"), Decision::Model("./a.py".to_string()));
    }

    #[test]
    fn match_is_case_folded() {
        let s = strategy(vec![entry("./a.py", &["Diabetes"])]);
        assert_eq!(s.select("DIABETES risk?"), Decision::Model("./a.py".to_string()));
    }

    #[test]
    fn empty_query_is_no_match() {
        let s = strategy(vec![entry("./a.py", &["flu"])]);
        assert_eq!(s.select(""), Decision::NoMatch);
        assert_eq!(s.select("   "), Decision::NoMatch);
    }
}
