use thiserror::Error;

/// Errors raised while decoding a recipe document
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The document is not valid JSON or a recipe is missing a required field
    #[error("Malformed recipe document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Two recipes in the same document share an id
    #[error("Duplicate recipe id: {0}")]
    DuplicateId(String),
}

/// Errors raised while loading a recipe collection from a bundle or a remote dataset
#[derive(Error, Debug)]
pub enum LoadError {
    /// The bundled resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The resource exists but could not be read
    #[error("Failed to read resource: {0}")]
    Io(#[from] std::io::Error),

    /// The resource was read but its contents are not a recipe document
    #[error("Failed to decode recipes: {0}")]
    Decode(#[from] DecodeError),

    /// The remote dataset could not be retrieved
    #[error("Failed to fetch recipes: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote dataset answered with a non-success status
    #[error("Recipe source answered with status {0}")]
    Status(u16),
}

/// Errors raised while fetching the ingredients of a recipe
#[derive(Error, Debug)]
pub enum FetchError {
    /// The source URL could not be parsed
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request failed before a response arrived
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server answered with status {0}")]
    Status(u16),

    /// The response body is not JSON
    #[error("Response is not valid JSON: {0}")]
    MalformedBody(String),

    /// The response JSON has no `ingredients` string
    #[error("Ingredients not found in the response")]
    MissingIngredients,
}

/// Top-level error for callers that drive the whole core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),
}
