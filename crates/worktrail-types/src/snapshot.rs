//! Snapshot records emitted by the recorder.

use serde::{Deserialize, Serialize};

/// File-system action captured while recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileActionKind {
    /// File was created.
    Create,
    /// File was deleted.
    Delete,
    /// File was renamed or moved.
    Rename,
}

impl std::fmt::Display for FileActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileActionKind::Create => write!(f, "create"),
            FileActionKind::Delete => write!(f, "delete"),
            FileActionKind::Rename => write!(f, "rename"),
        }
    }
}

/// One discrete unit of recorded activity.
///
/// Snapshots are stored in the order their activity completed. A `FileDiff`
/// always carries a non-empty change; the recorder never emits one for a
/// visit that left the file untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Snapshot {
    /// A contiguous editing session on a single file.
    FileDiff {
        /// Workspace-relative path of the edited file.
        file: String,
        /// Unified diff between the session's first and last content.
        diff: String,
    },
    /// A file was created, deleted, or renamed.
    FileAction {
        action: FileActionKind,
        file: String,
        /// Previous path, present for renames.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old_file: Option<String>,
    },
    /// A completed shell command.
    TerminalCommand {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<String>,
    },
}

impl Snapshot {
    /// Create a file diff snapshot.
    pub fn file_diff(file: impl Into<String>, diff: impl Into<String>) -> Self {
        Snapshot::FileDiff {
            file: file.into(),
            diff: diff.into(),
        }
    }

    /// Create a file action snapshot without a previous path.
    pub fn file_action(action: FileActionKind, file: impl Into<String>) -> Self {
        Snapshot::FileAction {
            action,
            file: file.into(),
            old_file: None,
        }
    }

    /// Create a rename snapshot.
    pub fn rename(old_file: impl Into<String>, file: impl Into<String>) -> Self {
        Snapshot::FileAction {
            action: FileActionKind::Rename,
            file: file.into(),
            old_file: Some(old_file.into()),
        }
    }

    /// Create a terminal command snapshot.
    pub fn terminal_command(command: impl Into<String>, cwd: Option<String>) -> Self {
        Snapshot::TerminalCommand {
            command: command.into(),
            cwd,
        }
    }

    /// The file this snapshot concerns, if any.
    pub fn file(&self) -> Option<&str> {
        match self {
            Snapshot::FileDiff { file, .. } | Snapshot::FileAction { file, .. } => Some(file),
            Snapshot::TerminalCommand { .. } => None,
        }
    }

    /// Short label for the snapshot kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Snapshot::FileDiff { .. } => "diff",
            Snapshot::FileAction { .. } => "file",
            Snapshot::TerminalCommand { .. } => "command",
        }
    }

    /// One-line human readable description.
    pub fn headline(&self) -> String {
        match self {
            Snapshot::FileDiff { file, .. } => format!("edit {}", file),
            Snapshot::FileAction {
                action: FileActionKind::Rename,
                file,
                old_file: Some(old),
            } => format!("rename {} -> {}", old, file),
            Snapshot::FileAction { action, file, .. } => format!("{} {}", action, file),
            Snapshot::TerminalCommand { command, .. } => format!("$ {}", command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_file_diff() {
        let snapshot = Snapshot::file_diff("src/x.txt", "--- src/x.txt\n+++ src/x.txt\n");
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["type"], "file_diff");
        assert_eq!(json["file"], "src/x.txt");
    }

    #[test]
    fn test_serialize_skips_missing_optionals() {
        let json = serde_json::to_string(&Snapshot::terminal_command("ls", None)).unwrap();
        assert!(!json.contains("cwd"));

        let json =
            serde_json::to_string(&Snapshot::file_action(FileActionKind::Create, "a.rs")).unwrap();
        assert!(!json.contains("old_file"));
        assert!(json.contains(r#""action":"create""#));
    }

    #[test]
    fn test_deserialize_rename() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{"type":"file_action","action":"rename","file":"b.rs","old_file":"a.rs"}"#,
        )
        .unwrap();
        assert_eq!(snapshot, Snapshot::rename("a.rs", "b.rs"));
    }

    #[test]
    fn test_file_accessor() {
        assert_eq!(Snapshot::file_diff("a", "d").file(), Some("a"));
        assert_eq!(Snapshot::terminal_command("ls", None).file(), None);
    }

    #[test]
    fn test_headline() {
        assert_eq!(Snapshot::rename("a.rs", "b.rs").headline(), "rename a.rs -> b.rs");
        assert_eq!(
            Snapshot::file_action(FileActionKind::Delete, "c.rs").headline(),
            "delete c.rs"
        );
        assert_eq!(
            Snapshot::terminal_command("echo hi", Some("/tmp".into())).headline(),
            "$ echo hi"
        );
        assert_eq!(Snapshot::file_diff("x.txt", "").headline(), "edit x.txt");
    }
}
