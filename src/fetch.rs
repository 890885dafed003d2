//! Ingredient lookup for a recipe's detail view.
//!
//! Each opened view gets its own [`IngredientTask`]; nothing is cached or
//! shared between views.

use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::FetchConfig;
use crate::error::{CoreError, FetchError};
use crate::model::Recipe;

/// Progress of one ingredient lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum IngredientFetchState {
    Idle,
    Loading,
    Loaded(String),
    Failed(String),
}

impl IngredientFetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, IngredientFetchState::Loading)
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            IngredientFetchState::Loaded(_) | IngredientFetchState::Failed(_)
        )
    }
}

/// Build the HTTP client shared by fetchers and remote loaders
pub fn build_client(config: &FetchConfig) -> Result<Client, CoreError> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| CoreError::Client(e.to_string()))
}

#[derive(Clone)]
pub struct IngredientFetcher {
    client: Client,
    search_url: String,
}

impl IngredientFetcher {
    /// Fetcher using the default search endpoint
    pub fn new(client: Client) -> Self {
        Self {
            client,
            search_url: FetchConfig::default().search_url,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, CoreError> {
        Ok(Self::new(build_client(config)?).with_search_url(&config.search_url))
    }

    /// Query `search_url` instead of the default search endpoint
    pub fn with_search_url(mut self, search_url: impl Into<String>) -> Self {
        self.search_url = search_url.into();
        self
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// GET `url` and return its `ingredients` string
    pub async fn fetch_ingredients(&self, url: &str) -> Result<String, FetchError> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!("Fetching ingredients from {}", url);
        let body = self.get_json(url).await?;
        extract_ingredients(&body)
    }

    /// Look up ingredients by recipe name on the search endpoint and return
    /// those of the first result
    pub async fn search_ingredients(&self, name: &str) -> Result<String, FetchError> {
        let mut url = Url::parse(&self.search_url).map_err(|e| FetchError::InvalidUrl {
            url: self.search_url.clone(),
            reason: e.to_string(),
        })?;
        // Form encoding: spaces become `+`
        url.query_pairs_mut().append_pair("q", name);

        debug!("Searching ingredients for {:?} at {}", name, url);
        let body = self.get_json(url).await?;
        let first = body
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .ok_or(FetchError::MissingIngredients)?;
        extract_ingredients(first)
    }

    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        response.json().await.map_err(|e| {
            if e.is_decode() {
                FetchError::MalformedBody(e.to_string())
            } else {
                FetchError::Network(e)
            }
        })
    }

    /// Start a lookup for `url` in the background.
    ///
    /// The returned task reports `Loading` immediately.
    pub fn spawn(&self, url: impl Into<String>) -> IngredientTask {
        let url = url.into();
        let fetcher = self.clone();
        IngredientTask::start(async move {
            fetcher.fetch_ingredients(&url).await.map_err(|e| {
                warn!("Error fetching ingredients from {}: {}", url, e);
                e
            })
        })
    }

    /// Start a search by recipe name in the background
    pub fn spawn_search(&self, name: impl Into<String>) -> IngredientTask {
        let name = name.into();
        let fetcher = self.clone();
        IngredientTask::start(async move {
            fetcher.search_ingredients(&name).await.map_err(|e| {
                warn!("Error searching ingredients for {:?}: {}", name, e);
                e
            })
        })
    }

    /// Start a lookup for `recipe` if it has a source URL
    pub fn spawn_for(&self, recipe: &Recipe) -> Option<IngredientTask> {
        match &recipe.source_url {
            Some(url) => Some(self.spawn(url.clone())),
            None => {
                debug!("Recipe {} has no source URL, skipping ingredients", recipe.id);
                None
            }
        }
    }
}

fn extract_ingredients(body: &Value) -> Result<String, FetchError> {
    body.get("ingredients")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(FetchError::MissingIngredients)
}

/// An in-flight or finished ingredient lookup owned by one detail view.
///
/// Dropping the task lets the request finish unobserved; call
/// [`IngredientTask::cancel`] when the view is torn down.
pub struct IngredientTask {
    sender: Arc<watch::Sender<IngredientFetchState>>,
    state: watch::Receiver<IngredientFetchState>,
    handle: Option<JoinHandle<()>>,
}

impl IngredientTask {
    fn start<F>(lookup: F) -> Self
    where
        F: Future<Output = Result<String, FetchError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(IngredientFetchState::Loading);
        let sender = Arc::new(tx);
        let tx = Arc::clone(&sender);

        let handle = tokio::spawn(async move {
            let state = match lookup.await {
                Ok(text) => IngredientFetchState::Loaded(text),
                Err(e) => IngredientFetchState::Failed(e.to_string()),
            };
            tx.send_replace(state);
        });

        Self {
            sender,
            state: rx,
            handle: Some(handle),
        }
    }

    pub fn state(&self) -> IngredientFetchState {
        self.state.borrow().clone()
    }

    /// A receiver the view can watch for state changes
    pub fn subscribe(&self) -> watch::Receiver<IngredientFetchState> {
        self.state.clone()
    }

    /// Wait until the lookup settles and return the final state
    pub async fn settled(&mut self) -> IngredientFetchState {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if e.is_cancelled() {
                    return IngredientFetchState::Idle;
                }
                // The lookup panicked before publishing a result
                self.sender
                    .send_replace(IngredientFetchState::Failed(e.to_string()));
            }
        }
        self.state()
    }

    /// Abort the lookup and publish `Idle` to every subscriber, unless it
    /// had already settled.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.sender.send_if_modified(|state| {
            if state.is_loading() {
                *state = IngredientFetchState::Idle;
                true
            } else {
                false
            }
        });
    }
}
