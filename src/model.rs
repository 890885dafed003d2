use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// A single dessert entry.
///
/// Field names on the wire follow the bundled `recipes.json` document; the
/// camel-case spellings are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "uuid", alias = "id")]
    pub id: String,
    pub name: String,
    pub cuisine: String,
    #[serde(rename = "photo_url_large", alias = "photoLarge")]
    pub photo_large: String,
    #[serde(rename = "photo_url_small", alias = "photoSmall")]
    pub photo_small: String,
    #[serde(rename = "youtube_url", alias = "videoURL", default)]
    pub video_url: Option<String>,
    #[serde(rename = "source_url", alias = "sourceURL", default)]
    pub source_url: Option<String>,
}

impl Recipe {
    /// Whether a video view should be offered for this recipe
    pub fn has_video(&self) -> bool {
        self.video_url.is_some()
    }

    /// Whether opening a detail view should attempt an ingredient fetch
    pub fn has_source(&self) -> bool {
        self.source_url.is_some()
    }

    pub(crate) fn matches(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
    }
}

/// Ordered, immutable list of recipes in source order.
///
/// Cloning is cheap; reloads build a new collection instead of mutating one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeCollection {
    recipes: Arc<[Recipe]>,
}

impl Default for RecipeCollection {
    fn default() -> Self {
        Self {
            recipes: Arc::from(Vec::new()),
        }
    }
}

impl RecipeCollection {
    pub fn new(recipes: Vec<Recipe>) -> Result<Self, DecodeError> {
        let mut seen = HashSet::with_capacity(recipes.len());
        for recipe in &recipes {
            if !seen.insert(recipe.id.as_str()) {
                return Err(DecodeError::DuplicateId(recipe.id.clone()));
            }
        }
        Ok(Self {
            recipes: recipes.into(),
        })
    }

    /// Decode a recipe document.
    ///
    /// Accepts `{"recipes": [...]}` as shipped in the bundle, or a bare array.
    pub fn from_json(data: &[u8]) -> Result<Self, DecodeError> {
        let document: RecipeDocument = serde_json::from_slice(data)?;
        Self::new(document.into_recipes())
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn to_vec(&self) -> Vec<Recipe> {
        self.recipes.to_vec()
    }
}

impl Deref for RecipeCollection {
    type Target = [Recipe];

    fn deref(&self) -> &[Recipe] {
        &self.recipes
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecipeDocument {
    Wrapped { recipes: Vec<Recipe> },
    Bare(Vec<Recipe>),
}

impl RecipeDocument {
    fn into_recipes(self) -> Vec<Recipe> {
        match self {
            RecipeDocument::Wrapped { recipes } => recipes,
            RecipeDocument::Bare(recipes) => recipes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = r#"{
        "recipes": [
            {
                "uuid": "0c6ca6e7-e32a-4053-b824-1dbf749910d8",
                "name": "Apam Balik",
                "cuisine": "Malaysian",
                "photo_url_large": "https://example.com/apam/large.jpg",
                "photo_url_small": "https://example.com/apam/small.jpg",
                "source_url": "https://example.com/apam",
                "youtube_url": "https://www.youtube.com/watch?v=6R8ffRRJcrg"
            },
            {
                "uuid": "599344f4-3c5c-4cca-b914-2210e3b3312f",
                "name": "Apple & Blackberry Crumble",
                "cuisine": "British",
                "photo_url_large": "https://example.com/crumble/large.jpg",
                "photo_url_small": "https://example.com/crumble/small.jpg",
                "youtube_url": null
            }
        ]
    }"#;

    #[test]
    fn test_decode_bundle_document() {
        let collection = RecipeCollection::from_json(BUNDLE.as_bytes()).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection[0].name, "Apam Balik");
        assert!(collection[0].has_video());
        assert!(collection[0].has_source());
        assert_eq!(collection[1].video_url, None);
        assert_eq!(collection[1].source_url, None);
    }

    #[test]
    fn test_decode_camel_case_aliases() {
        let json = r#"[{"id":"1","name":"Lava Cake","cuisine":"French","photoLarge":"a","photoSmall":"b","videoURL":null,"sourceURL":null}]"#;
        let collection = RecipeCollection::from_json(json.as_bytes()).unwrap();

        assert_eq!(collection.len(), 1);
        assert_eq!(collection[0].id, "1");
        assert_eq!(collection[0].photo_large, "a");
        assert_eq!(collection[0].photo_small, "b");
    }

    #[test]
    fn test_missing_required_field_fails_whole_document() {
        let json = r#"{"recipes":[
            {"uuid":"1","name":"Lava Cake","cuisine":"French","photo_url_large":"a","photo_url_small":"b"},
            {"uuid":"2","name":"Trifle","photo_url_large":"a","photo_url_small":"b"}
        ]}"#;

        let result = RecipeCollection::from_json(json.as_bytes());
        assert!(matches!(result, Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let json = r#"{"recipes":[
            {"uuid":"1","name":"Lava Cake","cuisine":"French","photo_url_large":"a","photo_url_small":"b"},
            {"uuid":"1","name":"Trifle","cuisine":"British","photo_url_large":"a","photo_url_small":"b"}
        ]}"#;

        match RecipeCollection::from_json(json.as_bytes()) {
            Err(DecodeError::DuplicateId(id)) => assert_eq!(id, "1"),
            other => panic!("expected duplicate id error, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let collection = RecipeCollection::from_json(BUNDLE.as_bytes()).unwrap();

        let recipe = collection.get("599344f4-3c5c-4cca-b914-2210e3b3312f").unwrap();
        assert_eq!(recipe.cuisine, "British");
        assert!(collection.get("missing").is_none());
    }
}
