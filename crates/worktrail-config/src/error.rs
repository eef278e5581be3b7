//! Configuration errors.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot render config as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The backend needs a key and neither the env var nor the config has one.
    #[error("no API key for the {backend} backend: set {env_var} or api_key under [llm]")]
    ApiKeyNotFound { backend: String, env_var: String },

    #[error("{field} is required in {context}")]
    MissingField { field: String, context: String },
}
