//! Synthesized workflow documents.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Extension used for persisted workflow documents.
pub const DOCUMENT_EXTENSION: &str = "md";

/// A finished workflow document.
///
/// `filename` is a bare stem without directory or extension; the
/// persistence layer decides where and how it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub filename: String,
}

impl Document {
    /// Create a document, normalizing the filename into a safe stem.
    pub fn new(content: impl Into<String>, filename: &str) -> Self {
        Self {
            content: content.into(),
            filename: slugify(filename),
        }
    }

    /// Filename with the document extension appended.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.filename, DOCUMENT_EXTENSION)
    }
}

/// Where finished documents go.
///
/// Recording and synthesis never touch the disk themselves; the caller hands
/// each document to a sink, which reports where it ended up.
pub trait DocumentSink {
    fn save(&self, document: &Document) -> Result<PathBuf>;
}

/// Turn arbitrary text into a lowercase, dash-separated filename stem.
///
/// Anything other than ASCII alphanumerics collapses into a single `-`.
/// A trailing `.md` is dropped. Empty results become `workflow`.
pub fn slugify(name: &str) -> String {
    let name = name.trim();
    let name = name
        .strip_suffix(&format!(".{}", DOCUMENT_EXTENSION))
        .unwrap_or(name);

    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "workflow".to_string()
    } else {
        slug
    }
}
