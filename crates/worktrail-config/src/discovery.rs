//! Locating and layering config files.
//!
//! Two layers, later wins section by section:
//! 1. `config.toml` in the user config dir (`$WORKTRAIL_CONFIG_DIR`, or
//!    `~/.config/worktrail` on Linux)
//! 2. `worktrail.toml` in the workspace

use std::path::{Path, PathBuf};

use crate::{ConfigError, Result, WorktrailConfig};

const PROJECT_CONFIG_FILE: &str = "worktrail.toml";
const USER_CONFIG_FILE: &str = "config.toml";
const APP_NAME: &str = "worktrail";
const CONFIG_DIR_ENV: &str = "WORKTRAIL_CONFIG_DIR";

/// A config file that was looked for.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// False when the file is missing or failed to parse.
    pub loaded: bool,
}

/// The merged config plus what went into it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: WorktrailConfig,
    /// Every candidate file, lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// Problems worth showing the user; loading carried on regardless.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load and merge the user and project layers.
///
/// Without a `project_dir` the project file is looked up in the current
/// directory.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Like [`load_config`], with the user config dir given explicitly.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let user_file = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => user_config_path(),
    };
    let project_file = project_dir
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));

    let mut loaded = LoadedConfig {
        config: WorktrailConfig::new(),
        sources: Vec::new(),
        warnings: Vec::new(),
    };
    for path in user_file.into_iter().chain([project_file]) {
        loaded.add_layer(path);
    }

    if let Some(llm) = loaded.config.llm.as_ref().filter(|llm| llm.has_plaintext_api_key()) {
        loaded.warnings.push(format!(
            "[llm] api_key is stored in plain text; prefer the {} env var",
            llm.effective_backend().env_var()
        ));
    }

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }
    Ok(loaded)
}

impl LoadedConfig {
    /// Merge the file at `path` if it exists. A file that fails to parse is
    /// skipped with a warning.
    fn add_layer(&mut self, path: PathBuf) {
        let loaded = path.is_file()
            && match load_config_file(&path) {
                Ok(layer) => {
                    tracing::debug!(path = %path.display(), "Loaded config layer");
                    self.config.merge(layer);
                    true
                }
                Err(e) => {
                    self.warnings.push(format!("Skipped {}: {}", path.display(), e));
                    false
                }
            };
        self.sources.push(ConfigSource { path, loaded });
    }
}

/// Parse one config file.
pub fn load_config_file(path: &Path) -> Result<WorktrailConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    WorktrailConfig::from_toml(&contents)
}

pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join(USER_CONFIG_FILE))
}

/// Directory holding the user config and the log files.
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|dir| dir.join(APP_NAME)),
    }
}
