//! Path handling for recorded files: workspace-relative naming and ignore
//! patterns.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{RecorderError, Result};

/// Decides which paths get recorded and how they are named in snapshots.
#[derive(Debug, Clone)]
pub struct PathFilter {
    workspace_root: Option<PathBuf>,
    ignore: GlobSet,
    patterns: Vec<String>,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self {
            workspace_root: None,
            ignore: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }
}

impl PathFilter {
    /// Filter with no workspace root and nothing ignored.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name files relative to this workspace root.
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Ignore paths matching any of these glob patterns.
    ///
    /// Patterns are tested against both the workspace-relative path and the
    /// bare file name, so `*.log` matches `logs/today.log`.
    pub fn with_ignore_patterns<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.into();
            let glob = Glob::new(&pattern).map_err(|e| RecorderError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            builder.add(glob);
            self.patterns.push(pattern);
        }
        self.ignore = builder.build().map_err(|e| RecorderError::InvalidPattern {
            pattern: self.patterns.join(", "),
            reason: e.to_string(),
        })?;
        Ok(self)
    }

    /// Express `path` relative to the workspace root.
    ///
    /// Paths outside the root, and all paths when no root is set, are
    /// returned unchanged. Separators are normalized to `/`.
    pub fn relative(&self, path: &str) -> String {
        let candidate = Path::new(path);
        let relative = self
            .workspace_root
            .as_deref()
            .and_then(|root| candidate.strip_prefix(root).ok())
            .filter(|rel| !rel.as_os_str().is_empty());

        match relative {
            Some(rel) => rel.to_string_lossy().replace('\\', "/"),
            None => {
                if self.workspace_root.is_some() && candidate.is_absolute() {
                    tracing::trace!(path, "File is outside the workspace root");
                }
                path.replace('\\', "/")
            }
        }
    }

    /// Whether a workspace-relative path should be left out of the recording.
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        if self.ignore.is_empty() {
            return false;
        }
        if self.ignore.is_match(relative_path) {
            return true;
        }
        Path::new(relative_path)
            .file_name()
            .is_some_and(|name| self.ignore.is_match(name))
    }
}
