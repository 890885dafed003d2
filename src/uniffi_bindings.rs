//! UniFFI bindings for dessert-browser
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! Async operations run on a tokio runtime owned by the bindings; the
//! platform UI thread only ever sees finished values.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    AppConfig, CoreError, DecodeError, FetchError, IngredientFetchState, LoadError, PullGesture,
    Recipe, RecipeBrowser, RecipeCollection, RefreshOutcome, RefreshState,
};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible recipe structure
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipe {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub photo_large: String,
    pub photo_small: String,
    /// Video to embed, if any
    pub video_url: Option<String>,
    /// Where ingredients are fetched from, if anywhere
    pub source_url: Option<String>,
}

impl From<Recipe> for FfiRecipe {
    fn from(recipe: Recipe) -> Self {
        FfiRecipe {
            id: recipe.id,
            name: recipe.name,
            cuisine: recipe.cuisine,
            photo_large: recipe.photo_large,
            photo_small: recipe.photo_small,
            video_url: recipe.video_url,
            source_url: recipe.source_url,
        }
    }
}

impl From<FfiRecipe> for Recipe {
    fn from(ffi: FfiRecipe) -> Self {
        Recipe {
            id: ffi.id,
            name: ffi.name,
            cuisine: ffi.cuisine,
            photo_large: ffi.photo_large,
            photo_small: ffi.photo_small,
            video_url: ffi.video_url,
            source_url: ffi.source_url,
        }
    }
}

/// FFI-compatible ingredient lookup state
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiIngredientState {
    Idle,
    Loading,
    Loaded { text: String },
    Failed { message: String },
}

impl From<IngredientFetchState> for FfiIngredientState {
    fn from(state: IngredientFetchState) -> Self {
        match state {
            IngredientFetchState::Idle => FfiIngredientState::Idle,
            IngredientFetchState::Loading => FfiIngredientState::Loading,
            IngredientFetchState::Loaded(text) => FfiIngredientState::Loaded { text },
            IngredientFetchState::Failed(message) => FfiIngredientState::Failed { message },
        }
    }
}

/// What the pull-to-refresh header should draw
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiPullIndicator {
    pub rotation: f64,
    pub spinner: bool,
    pub label: String,
}

/// FFI-compatible error type
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiBrowserError {
    /// The bundled resource is missing
    NotFound { message: String },
    /// Recipe data could not be decoded
    DecodeError { message: String },
    /// A network request failed
    FetchError { message: String },
    /// Configuration error
    ConfigError { message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiBrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiBrowserError::NotFound { message } => write!(f, "Not found: {}", message),
            FfiBrowserError::DecodeError { message } => write!(f, "Decode error: {}", message),
            FfiBrowserError::FetchError { message } => write!(f, "Fetch error: {}", message),
            FfiBrowserError::ConfigError { message } => write!(f, "Config error: {}", message),
            FfiBrowserError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiBrowserError {}

impl From<DecodeError> for FfiBrowserError {
    fn from(err: DecodeError) -> Self {
        FfiBrowserError::DecodeError {
            message: err.to_string(),
        }
    }
}

impl From<LoadError> for FfiBrowserError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound(path) => FfiBrowserError::NotFound { message: path },
            LoadError::Decode(e) => e.into(),
            other => FfiBrowserError::FetchError {
                message: other.to_string(),
            },
        }
    }
}

impl From<FetchError> for FfiBrowserError {
    fn from(err: FetchError) -> Self {
        FfiBrowserError::FetchError {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for FfiBrowserError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Decode(e) => e.into(),
            CoreError::Load(e) => e.into(),
            CoreError::Fetch(e) => e.into(),
            CoreError::Config(e) => FfiBrowserError::ConfigError {
                message: e.to_string(),
            },
            CoreError::Client(message) => FfiBrowserError::ConfigError { message },
        }
    }
}

/// Create a new tokio runtime for FFI calls
fn create_runtime() -> Result<tokio::runtime::Runtime, FfiBrowserError> {
    tokio::runtime::Runtime::new().map_err(|e| FfiBrowserError::RuntimeError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

fn collection_from(recipes: Vec<FfiRecipe>) -> Result<RecipeCollection, FfiBrowserError> {
    Ok(RecipeCollection::new(
        recipes.into_iter().map(Recipe::from).collect(),
    )?)
}

/// Decode a recipe document (the contents of `recipes.json`)
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn decode_recipes(json: String) -> Result<Vec<FfiRecipe>, FfiBrowserError> {
    let collection = RecipeCollection::from_json(json.as_bytes())?;
    Ok(collection.to_vec().into_iter().map(FfiRecipe::from).collect())
}

/// Recipes whose name contains `query`, ignoring case
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn filter_recipes(
    recipes: Vec<FfiRecipe>,
    query: String,
) -> Result<Vec<FfiRecipe>, FfiBrowserError> {
    let collection = collection_from(recipes)?;
    Ok(crate::filter(&collection, &query)
        .into_iter()
        .map(FfiRecipe::from)
        .collect())
}

/// Names to suggest while `query` is being typed
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn suggest_recipe_names(
    recipes: Vec<FfiRecipe>,
    query: String,
) -> Result<Vec<String>, FfiBrowserError> {
    let collection = collection_from(recipes)?;
    Ok(crate::suggest(&collection, &query))
}

/// Fetch the ingredients text for a recipe's source URL
///
/// Blocks the calling thread; call it off the UI thread.
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn fetch_ingredients(url: String) -> FfiIngredientState {
    let rt = match create_runtime() {
        Ok(rt) => rt,
        Err(e) => return FfiIngredientState::Failed { message: e.to_string() },
    };
    rt.block_on(async {
        match crate::fetch_ingredients(&url).await {
            Ok(text) => FfiIngredientState::Loaded { text },
            Err(e) => FfiIngredientState::Failed {
                message: e.to_string(),
            },
        }
    })
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Stateful recipe screen backed by its own async runtime
#[cfg_attr(feature = "uniffi", derive(uniffi::Object))]
pub struct FfiRecipeBrowser {
    runtime: tokio::runtime::Runtime,
    browser: RecipeBrowser,
    gesture: Mutex<PullGesture>,
}

#[cfg_attr(feature = "uniffi", uniffi::export)]
impl FfiRecipeBrowser {
    /// Create a browser reading its bundle from `resource_dir`
    #[cfg_attr(feature = "uniffi", uniffi::constructor)]
    pub fn new(resource_dir: String) -> Result<Arc<Self>, FfiBrowserError> {
        let mut config = AppConfig::default();
        config.bundle.resource_dir = resource_dir.into();
        let runtime = create_runtime()?;
        let browser = RecipeBrowser::new(config)?;
        let gesture = Mutex::new(browser.pull_gesture());
        Ok(Arc::new(Self {
            runtime,
            browser,
            gesture,
        }))
    }

    /// Load the bundle; returns how many recipes are shown
    pub fn start(&self) -> Result<u64, FfiBrowserError> {
        let count = self.runtime.block_on(self.browser.start())?;
        Ok(count as u64)
    }

    pub fn recipes(&self) -> Vec<FfiRecipe> {
        self.browser
            .recipes()
            .to_vec()
            .into_iter()
            .map(FfiRecipe::from)
            .collect()
    }

    pub fn search(&self, query: String) -> Vec<FfiRecipe> {
        crate::filter(&self.browser.recipes(), &query)
            .into_iter()
            .map(FfiRecipe::from)
            .collect()
    }

    pub fn suggestions(&self, query: String) -> Vec<String> {
        crate::suggest(&self.browser.recipes(), &query)
    }

    pub fn is_refreshing(&self) -> bool {
        self.browser.controller().state() == RefreshState::Refreshing
    }

    /// Feed a scroll offset; returns `true` if it started a reload
    pub fn pull(&self, offset: f64) -> bool {
        let _guard = self.runtime.enter();
        let mut gesture = self.gesture.lock().unwrap_or_else(PoisonError::into_inner);
        gesture.drive(offset, self.browser.controller()).is_some()
    }

    pub fn pull_indicator(&self) -> FfiPullIndicator {
        let gesture = self.gesture.lock().unwrap_or_else(PoisonError::into_inner);
        let indicator = gesture.indicator(self.browser.controller().state());
        FfiPullIndicator {
            rotation: indicator.rotation,
            spinner: indicator.spinner,
            label: indicator.label.to_string(),
        }
    }

    /// Run a reload to completion. Returns `false` if one was already running.
    pub fn refresh(&self) -> Result<bool, FfiBrowserError> {
        let handle = {
            let _guard = self.runtime.enter();
            self.browser.controller().request_refresh()
        };
        let Some(handle) = handle else {
            return Ok(false);
        };
        let outcome = self.runtime.block_on(handle.outcome());
        self.gesture
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();
        match outcome {
            RefreshOutcome::Replaced { .. } | RefreshOutcome::Cancelled => Ok(true),
            RefreshOutcome::Failed(message) => Err(FfiBrowserError::FetchError { message }),
        }
    }

    /// Ingredients for the recipe with `id`; `Idle` when it has no source
    pub fn ingredients(&self, id: String) -> FfiIngredientState {
        let recipes = self.browser.recipes();
        let Some(recipe) = recipes.get(&id) else {
            return FfiIngredientState::Failed {
                message: format!("Unknown recipe: {}", id),
            };
        };
        match self.runtime.block_on(async {
            match self.browser.open_detail(recipe) {
                Some(mut task) => Some(task.settled().await),
                None => None,
            }
        }) {
            Some(state) => state.into(),
            None => FfiIngredientState::Idle,
        }
    }

    /// Ingredients of the first search result for the recipe's name
    pub fn search_ingredients(&self, id: String) -> FfiIngredientState {
        let recipes = self.browser.recipes();
        let Some(recipe) = recipes.get(&id) else {
            return FfiIngredientState::Failed {
                message: format!("Unknown recipe: {}", id),
            };
        };
        self.runtime
            .block_on(async { self.browser.search_ingredients(recipe).settled().await })
            .into()
    }
}
