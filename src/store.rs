use log::{debug, warn};

use crate::error::DecodeError;
use crate::model::RecipeCollection;

/// Holds the currently displayed recipe collection.
///
/// The collection is only ever swapped as a whole.
#[derive(Debug, Default)]
pub struct RecipeStore {
    collection: RecipeCollection,
}

impl RecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `data` and make it the current collection.
    ///
    /// On failure the current collection is left untouched.
    pub fn load(&mut self, data: &[u8]) -> Result<RecipeCollection, DecodeError> {
        match RecipeCollection::from_json(data) {
            Ok(collection) => {
                self.replace(collection.clone());
                Ok(collection)
            }
            Err(e) => {
                warn!("Keeping {} recipes, decode failed: {}", self.collection.len(), e);
                Err(e)
            }
        }
    }

    pub fn replace(&mut self, collection: RecipeCollection) {
        debug!(
            "Replacing {} recipes with {}",
            self.collection.len(),
            collection.len()
        );
        self.collection = collection;
    }

    pub fn current(&self) -> RecipeCollection {
        self.collection.clone()
    }
}
