use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Where the bundled recipe resource lives
    #[serde(default)]
    pub bundle: BundleConfig,
    /// HTTP settings for ingredient and dataset requests
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Pull-to-refresh settings
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Remote dataset to reload from instead of the bundle
    pub source_url: Option<String>,
}

/// Location of the bundled recipe resource, resolved by logical name
#[derive(Debug, Deserialize, Clone)]
pub struct BundleConfig {
    /// Directory holding packaged resources
    #[serde(default = "default_resource_dir")]
    pub resource_dir: PathBuf,
    /// Resource name without extension
    #[serde(default = "default_resource_name")]
    pub name: String,
    /// Resource extension
    #[serde(default = "default_resource_extension")]
    pub extension: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            resource_dir: default_resource_dir(),
            name: default_resource_name(),
            extension: default_resource_extension(),
        }
    }
}

impl BundleConfig {
    pub fn path(&self) -> PathBuf {
        self.resource_dir
            .join(format!("{}.{}", self.name, self.extension))
    }
}

/// HTTP client settings
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Recipe search endpoint queried by name for ingredients
    #[serde(default = "default_search_url")]
    pub search_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            search_url: default_search_url(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Pull gesture settings
#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    /// Pull distance in points past which a refresh fires
    #[serde(default = "default_pull_threshold")]
    pub pull_threshold: f64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            pull_threshold: default_pull_threshold(),
        }
    }
}

// Default value functions
fn default_resource_dir() -> PathBuf {
    PathBuf::from("resources")
}

fn default_resource_name() -> String {
    "recipes".to_string()
}

fn default_resource_extension() -> String {
    "json".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("DessertBrowser/{}", env!("CARGO_PKG_VERSION"))
}

fn default_search_url() -> String {
    "http://www.recipepuppy.com/api/".to_string()
}

fn default_pull_threshold() -> f64 {
    50.0
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with DESSERT__ prefix
    /// 2. dessert.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: DESSERT__FETCH__TIMEOUT
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Reject values the rest of the crate cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.refresh.pull_threshold;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(ConfigError::Message(format!(
                "refresh.pull_threshold must be positive, got {}",
                threshold
            )));
        }
        Ok(())
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("dessert").required(false))
        // Use double underscore for nested: DESSERT__BUNDLE__RESOURCE_DIR
        .add_source(
            Environment::with_prefix("DESSERT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
