//! Configuration system for worktrail.
//!
//! Provides TOML-based configuration with:
//! - The narration backend (`[llm]`)
//! - Synthesis limits and the document folder (`[workflow]`)
//! - Paths left out of recordings (`[recording]`)
//! - Config file layering (user config + project-local overrides)
//! - API key resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{ResolvedSecret, SecretSource, resolve_api_key};
pub use types::*;
