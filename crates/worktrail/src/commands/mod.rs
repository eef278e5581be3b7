//! CLI command handlers.

pub mod config;
pub mod find;
pub mod replay;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Resolve the workspace root: the given directory, or the current one.
pub fn workspace_root(dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Could not determine current directory")?,
    };
    dir.canonicalize()
        .with_context(|| format!("Workspace directory not found: {}", dir.display()))
}
