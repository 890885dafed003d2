//! Sources that produce a fresh [`RecipeCollection`].
//!
//! The refresh controller only sees the [`RecipeSource`] trait, so the
//! bundled resource and a remote dataset are interchangeable.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

use crate::config::{AppConfig, BundleConfig};
use crate::error::LoadError;
use crate::model::RecipeCollection;

/// Anything that can produce a complete recipe collection
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Short name used in log lines
    fn source_name(&self) -> &str;

    async fn load(&self) -> Result<RecipeCollection, LoadError>;
}

/// Reads the packaged `recipes.json` resource
pub struct BundleLoader {
    path: PathBuf,
}

impl BundleLoader {
    pub fn new(bundle: &BundleConfig) -> Self {
        Self {
            path: bundle.path(),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl RecipeSource for BundleLoader {
    fn source_name(&self) -> &str {
        "bundle"
    }

    async fn load(&self) -> Result<RecipeCollection, LoadError> {
        debug!("Reading bundled recipes from {}", self.path.display());
        let data = tokio::fs::read(&self.path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                LoadError::NotFound(self.path.display().to_string())
            } else {
                LoadError::Io(e)
            }
        })?;
        let collection = RecipeCollection::from_json(&data)?;
        info!("Loaded {} bundled recipes", collection.len());
        Ok(collection)
    }
}

/// Downloads the recipe document from a remote URL
pub struct RemoteLoader {
    url: String,
    client: Client,
}

impl RemoteLoader {
    pub fn new(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl RecipeSource for RemoteLoader {
    fn source_name(&self) -> &str {
        "remote"
    }

    async fn load(&self) -> Result<RecipeCollection, LoadError> {
        debug!("Fetching recipes from {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(LoadError::Status(response.status().as_u16()));
        }
        let data = response.bytes().await?;
        let collection = RecipeCollection::from_json(&data)?;
        info!("Loaded {} recipes from {}", collection.len(), self.url);
        Ok(collection)
    }
}

/// Pick the reload source for `config`: the remote dataset when one is
/// configured, the bundle otherwise.
pub fn source_for(config: &AppConfig, client: Client) -> Box<dyn RecipeSource> {
    match &config.source_url {
        Some(url) => Box::new(RemoteLoader::new(url.clone(), client)),
        None => Box::new(BundleLoader::new(&config.bundle)),
    }
}

/// Load the bundled resource described by `config`
pub async fn load_bundled(config: &AppConfig) -> Result<RecipeCollection, LoadError> {
    BundleLoader::new(&config.bundle).load().await
}
