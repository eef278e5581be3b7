//! Editor events consumed by the recorder.
//!
//! These mirror what an editor integration observes: document content
//! changes, file-system actions, and shell command lifecycle. Events
//! serialize as internally tagged JSON so an event log can be written one
//! event per line.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::snapshot::FileActionKind;

/// URI scheme of documents backed by a real file.
pub const FILE_SCHEME: &str = "file";

fn default_scheme() -> String {
    FILE_SCHEME.to_string()
}

/// A single range replacement reported with a text change.
///
/// Edits are stated against a running buffer that starts as the post-change
/// text: replacing `offset..offset + length_removed` with `inserted_text`,
/// edit after edit, yields the text as it was before the change. Offsets
/// and lengths count characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub offset: usize,
    pub length_removed: usize,
    pub inserted_text: String,
}

impl TextEdit {
    /// Create a new text edit.
    pub fn new(offset: usize, length_removed: usize, inserted_text: impl Into<String>) -> Self {
        Self {
            offset,
            length_removed,
            inserted_text: inserted_text.into(),
        }
    }

    /// Create a pure insertion.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(offset, 0, text)
    }

    /// Create a pure deletion.
    pub fn delete(offset: usize, length: usize) -> Self {
        Self::new(offset, length, "")
    }
}

/// An event observed in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    /// Document content changed.
    TextChange {
        /// Path of the changed document.
        file: String,
        /// URI scheme of the document; only `file` documents are recorded.
        #[serde(default = "default_scheme")]
        scheme: String,
        /// Full document text after the change.
        text: String,
        /// The range edits making up this change.
        #[serde(default)]
        edits: Vec<TextEdit>,
    },
    /// A file was created, deleted, or renamed.
    FileAction {
        action: FileActionKind,
        file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old_file: Option<String>,
    },
    /// A shell command started executing.
    CommandStart {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<String>,
    },
    /// A shell command finished executing.
    CommandEnd {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<String>,
    },
}

impl EditorEvent {
    /// Text change on a regular file.
    pub fn text_change(file: impl Into<String>, text: impl Into<String>, edits: Vec<TextEdit>) -> Self {
        EditorEvent::TextChange {
            file: file.into(),
            scheme: default_scheme(),
            text: text.into(),
            edits,
        }
    }

    /// Command start without a working directory.
    pub fn command_start(command: impl Into<String>) -> Self {
        EditorEvent::CommandStart {
            command: command.into(),
            cwd: None,
        }
    }

    /// Command end without a working directory.
    pub fn command_end(command: impl Into<String>) -> Self {
        EditorEvent::CommandEnd {
            command: command.into(),
            cwd: None,
        }
    }

    /// File action without a previous path.
    pub fn file_action(action: FileActionKind, file: impl Into<String>) -> Self {
        EditorEvent::FileAction {
            action,
            file: file.into(),
            old_file: None,
        }
    }

    /// Parse one line of a JSON-lines event log.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments.
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| Error::InvalidEvent(e.to_string()))
    }

    /// Whether this event concerns a document backed by a real file.
    pub fn is_file_backed(&self) -> bool {
        match self {
            EditorEvent::TextChange { scheme, .. } => scheme == FILE_SCHEME,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_change_defaults_scheme() {
        let event = EditorEvent::parse_line(
            r#"{"type":"text_change","file":"x.txt","text":"ab","edits":[{"offset":1,"length_removed":1,"inserted_text":""}]}"#,
        )
        .unwrap()
        .unwrap();

        match event {
            EditorEvent::TextChange {
                scheme, edits, text, ..
            } => {
                assert_eq!(scheme, "file");
                assert_eq!(text, "ab");
                assert_eq!(edits, vec![TextEdit::delete(1, 1)]);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_command_events() {
        let start = EditorEvent::parse_line(r#"{"type":"command_start","command":"echo hi"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(start, EditorEvent::command_start("echo hi"));

        let end = EditorEvent::parse_line(
            r#"{"type":"command_end","command":"echo hi","cwd":"/repo"}"#,
        )
        .unwrap()
        .unwrap();
        assert!(matches!(end, EditorEvent::CommandEnd { cwd: Some(ref c), .. } if c == "/repo"));
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert!(EditorEvent::parse_line("").unwrap().is_none());
        assert!(EditorEvent::parse_line("   ").unwrap().is_none());
        assert!(EditorEvent::parse_line("# recorded by hand").unwrap().is_none());
    }

    #[test]
    fn test_parse_invalid_line() {
        let err = EditorEvent::parse_line(r#"{"type":"unknown"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidEvent(_)));
    }

    #[test]
    fn test_is_file_backed() {
        assert!(EditorEvent::text_change("a", "b", vec![]).is_file_backed());

        let untitled = EditorEvent::TextChange {
            file: "Untitled-1".into(),
            scheme: "untitled".into(),
            text: String::new(),
            edits: vec![],
        };
        assert!(!untitled.is_file_backed());
        assert!(EditorEvent::command_start("ls").is_file_backed());
    }
}
