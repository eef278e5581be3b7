//! Writing workflow documents into a folder.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use worktrail_types::{DOCUMENT_EXTENSION, Document, DocumentSink};

/// Saves documents as `<folder>/<filename>.md`.
///
/// Existing files are never overwritten: a clash gets `-1`, `-2`, ...
/// appended to the stem.
#[derive(Debug, Clone)]
pub struct FolderSink {
    folder: PathBuf,
}

impl FolderSink {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn candidate(&self, stem: &str, attempt: usize) -> PathBuf {
        let name = if attempt == 0 {
            format!("{}.{}", stem, DOCUMENT_EXTENSION)
        } else {
            format!("{}-{}.{}", stem, attempt, DOCUMENT_EXTENSION)
        };
        self.folder.join(name)
    }
}

impl DocumentSink for FolderSink {
    fn save(&self, document: &Document) -> worktrail_types::Result<PathBuf> {
        fs::create_dir_all(&self.folder)?;

        let mut attempt = 0;
        loop {
            let path = self.candidate(&document.filename, attempt);
            // create_new makes the existence check and the create one step
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(document.content.as_bytes())?;
                    if !document.content.ends_with('\n') {
                        file.write_all(b"\n")?;
                    }
                    tracing::info!(path = %path.display(), "Saved workflow document");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_folder_and_writes() {
        let dir = TempDir::new().unwrap();
        let sink = FolderSink::new(dir.path().join(".worktrail"));

        let path = sink.save(&Document::new("# Setup", "setup")).unwrap();
        assert_eq!(path, dir.path().join(".worktrail").join("setup.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Setup\n");
    }

    #[test]
    fn test_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let sink = FolderSink::new(dir.path());
        let doc = Document::new("second", "setup");
        fs::write(dir.path().join("setup.md"), "first").unwrap();

        let first = sink.save(&doc).unwrap();
        let second = sink.save(&doc).unwrap();

        assert_eq!(first, dir.path().join("setup-1.md"));
        assert_eq!(second, dir.path().join("setup-2.md"));
        assert_eq!(fs::read_to_string(dir.path().join("setup.md")).unwrap(), "first");
    }
}
