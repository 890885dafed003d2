//! Case-insensitive name search over a recipe collection.
//!
//! Matching is a plain substring test on the lowercased name; results keep
//! the collection's order and there is no ranking.

use serde::Serialize;

use crate::model::{Recipe, RecipeCollection};

/// Recipes whose name contains `query`, ignoring case.
///
/// An empty query returns the whole collection.
pub fn filter(collection: &RecipeCollection, query: &str) -> Vec<Recipe> {
    if query.is_empty() {
        return collection.to_vec();
    }
    let needle = query.to_lowercase();
    collection
        .iter()
        .filter(|r| r.matches(&needle))
        .cloned()
        .collect()
}

/// Names of the recipes [`filter`] would return, or nothing for an empty query.
pub fn suggest(collection: &RecipeCollection, query: &str) -> Vec<String> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    collection
        .iter()
        .filter(|r| r.matches(&needle))
        .map(|r| r.name.clone())
        .collect()
}

/// Query text plus the lists derived from it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub filtered: Vec<Recipe>,
    pub suggestions: Vec<String>,
}

impl SearchState {
    pub fn new(collection: &RecipeCollection, query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            filtered: filter(collection, &query),
            suggestions: suggest(collection, &query),
            query,
        }
    }

    /// Recompute the derived lists after the collection changed
    pub fn refresh(&self, collection: &RecipeCollection) -> Self {
        Self::new(collection, self.query.clone())
    }
}
