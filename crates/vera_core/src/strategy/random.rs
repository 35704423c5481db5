//! Random strategy - uniform baseline for offline evaluation.

use crate::catalog::Catalog;
use crate::strategy::Decision;
use rand::seq::SliceRandom;

/// Uniformly samples a catalog entry regardless of the query. A lower
/// bound for accuracy comparisons; never part of the production decision
/// path.
pub struct RandomStrategy {
    paths: Vec<String>,
}

impl RandomStrategy {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            paths: catalog.entries().iter().map(|e| e.path.clone()).collect(),
        }
    }

    pub fn select(&self, _query: &str) -> Decision {
        match self.paths.choose(&mut rand::thread_rng()) {
            Some(path) => Decision::Model(path.clone()),
            None => Decision::NoMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;

    #[test]
    fn always_returns_a_catalog_path() {
        let catalog = Catalog::from_entries(vec![
            CatalogEntry {
                path: "./a.py".to_string(),
                description: "a".to_string(),
                tags: vec![],
                keywords: vec![],
            },
            CatalogEntry {
                path: "./b.py".to_string(),
                description: "b".to_string(),
                tags: vec![],
                keywords: vec![],
            },
        ])
        .unwrap();
        let s = RandomStrategy::new(&catalog);

        for _ in 0..20 {
            match s.select("ignored") {
                Decision::Model(path) => assert!(catalog.contains_path(&path)),
                Decision::NoMatch => panic!("random strategy abstained on a non-empty catalog"),
            }
        }
    }
}
