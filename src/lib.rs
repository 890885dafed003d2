pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod model;
pub mod refresh;
pub mod search;
pub mod store;
pub mod view_model;

// UniFFI bindings for iOS/Android
pub mod uniffi_bindings;

use std::sync::Arc;

use log::debug;

pub use config::AppConfig;
pub use error::{CoreError, DecodeError, FetchError, LoadError};
pub use fetch::{IngredientFetchState, IngredientFetcher, IngredientTask};
pub use loader::{BundleLoader, RecipeSource, RemoteLoader};
pub use model::{Recipe, RecipeCollection};
pub use refresh::{PullGesture, PullIndicator, RefreshController, RefreshHandle, RefreshOutcome, RefreshState};
pub use search::{filter, suggest, SearchState};
pub use store::RecipeStore;
pub use view_model::{reduce, Action, ThemeColor, ViewModel};

/// Everything the recipe screen needs, wired from one configuration
pub struct RecipeBrowser {
    config: AppConfig,
    controller: RefreshController,
    fetcher: IngredientFetcher,
}

impl RecipeBrowser {
    /// Build a browser that reloads from the source named in `config`
    pub fn new(config: AppConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let client = fetch::build_client(&config.fetch)?;
        let source: Arc<dyn RecipeSource> = Arc::from(loader::source_for(&config, client.clone()));
        Ok(Self::with_source(config, source, client))
    }

    /// Build a browser around an explicit reload source
    pub fn with_source(
        config: AppConfig,
        source: Arc<dyn RecipeSource>,
        client: reqwest::Client,
    ) -> Self {
        debug!("Creating recipe browser backed by {}", source.source_name());
        Self {
            controller: RefreshController::new(source),
            fetcher: IngredientFetcher::new(client).with_search_url(&config.fetch.search_url),
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn controller(&self) -> &RefreshController {
        &self.controller
    }

    pub fn fetcher(&self) -> &IngredientFetcher {
        &self.fetcher
    }

    /// A pull gesture using the configured threshold
    pub fn pull_gesture(&self) -> PullGesture {
        PullGesture::new(self.config.refresh.pull_threshold)
    }

    /// Load recipes at startup; on failure the grid stays empty
    pub async fn start(&self) -> Result<usize, LoadError> {
        self.controller.load_initial().await
    }

    pub fn recipes(&self) -> RecipeCollection {
        self.controller.current()
    }

    /// Fresh view model over the current collection
    pub fn view_model(&self) -> ViewModel {
        let (collection, state) = self.controller.snapshot();
        let mut vm = ViewModel::new(&collection);
        vm.refresh = state;
        vm.pull = self.pull_gesture().indicator(state);
        vm
    }

    /// Open the detail view for `recipe`, starting its ingredient lookup
    pub fn open_detail(&self, recipe: &Recipe) -> Option<IngredientTask> {
        self.fetcher.spawn_for(recipe)
    }

    /// Search for `recipe` by name and show the first result's ingredients
    pub fn search_ingredients(&self, recipe: &Recipe) -> IngredientTask {
        self.fetcher.spawn_search(recipe.name.clone())
    }
}

/// Load the bundled recipes using configuration from `dessert.toml` and the environment
pub async fn load_recipes() -> Result<RecipeCollection, CoreError> {
    let config = AppConfig::load()?;
    Ok(loader::load_bundled(&config).await?)
}

/// Fetch the ingredients text at `url` with default HTTP settings
pub async fn fetch_ingredients(url: &str) -> Result<String, CoreError> {
    let fetcher = IngredientFetcher::from_config(&config::FetchConfig::default())?;
    Ok(fetcher.fetch_ingredients(url).await?)
}
