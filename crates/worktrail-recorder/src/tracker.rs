//! Coalesces editor events into snapshots.
//!
//! The tracker keeps at most one open accumulation, scoped to a single file,
//! holding the file's content from before the first edit of the visit and
//! after the latest one. The accumulation closes when the user moves to
//! another file, a command starts, a file action arrives, or recording
//! stops. Closing emits a [`Snapshot::FileDiff`] only if the content
//! actually changed.
//!
//! ```text
//!            text edit (f)                     text edit (f)
//!  Closed ───────────────► Open(f, s, e) ◄──────────────────┐
//!    ▲                         │  │                         │
//!    │   command start /       │  └─────────────────────────┘
//!    │   file action / flush   │
//!    └─────────────────────────┘  text edit (g ≠ f): flush, open g
//! ```
//!
//! Edits observed while a command is running are dropped: they are the
//! command's output (generated code, formatter rewrites), not the user's.

use tracing::{debug, trace};
use worktrail_types::{FileActionKind, Snapshot, TextEdit};

use crate::diff::unified_diff;
use crate::reconstruct::content_before_change;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Accumulator {
    Closed,
    Open {
        file: String,
        start: String,
        end: String,
    },
}

/// State machine turning edit and command events into snapshots.
///
/// Every method runs to completion and returns what it emitted; the caller
/// decides where snapshots go.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    accumulator: Accumulator,
    command_running: bool,
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self {
            accumulator: Accumulator::Closed,
            command_running: false,
        }
    }

    /// Whether a shell command is currently executing.
    pub fn is_command_running(&self) -> bool {
        self.command_running
    }

    /// File of the open accumulation, if any.
    pub fn open_file(&self) -> Option<&str> {
        match &self.accumulator {
            Accumulator::Open { file, .. } => Some(file),
            Accumulator::Closed => None,
        }
    }

    /// Handle a content change on `file`.
    ///
    /// `text` is the full document after the change. Returns the diff of the
    /// previously open file when this change switches files.
    pub fn on_text_change(&mut self, file: &str, text: &str, edits: &[TextEdit]) -> Option<Snapshot> {
        if self.command_running {
            trace!(file, "Command running, ignoring edit");
            return None;
        }

        match &mut self.accumulator {
            Accumulator::Open { file: open, end, .. } if open.as_str() == file => {
                *end = text.to_string();
                None
            }
            Accumulator::Open { file: open, .. } => {
                debug!(from = %open, to = file, "Switched files");
                let flushed = self.flush();
                self.open(file, text, edits);
                flushed
            }
            Accumulator::Closed => {
                debug!(file, "Started editing file");
                self.open(file, text, edits);
                None
            }
        }
    }

    fn open(&mut self, file: &str, text: &str, edits: &[TextEdit]) {
        self.accumulator = Accumulator::Open {
            file: file.to_string(),
            start: content_before_change(text, edits),
            end: text.to_string(),
        };
    }

    /// A shell command started: close any open accumulation.
    pub fn on_command_start(&mut self) -> Option<Snapshot> {
        self.command_running = true;
        self.flush()
    }

    /// A shell command finished. Always yields a terminal command snapshot.
    pub fn on_command_end(&mut self, command: impl Into<String>, cwd: Option<String>) -> Snapshot {
        self.command_running = false;
        Snapshot::terminal_command(command, cwd)
    }

    /// A file was created, deleted, or renamed.
    ///
    /// The open accumulation is closed first so its diff precedes the action.
    pub fn on_file_action(
        &mut self,
        action: FileActionKind,
        file: impl Into<String>,
        old_file: Option<String>,
    ) -> Vec<Snapshot> {
        let mut emitted: Vec<Snapshot> = self.flush().into_iter().collect();
        emitted.push(Snapshot::FileAction {
            action,
            file: file.into(),
            old_file,
        });
        emitted
    }

    /// Close the open accumulation.
    ///
    /// Returns a diff snapshot if the file's content changed over the visit.
    /// The accumulator is reset either way.
    pub fn flush(&mut self) -> Option<Snapshot> {
        match std::mem::replace(&mut self.accumulator, Accumulator::Closed) {
            Accumulator::Open { file, start, end } if start != end => {
                debug!(file = %file, "Flushing file diff");
                let diff = unified_diff(&file, &start, &end);
                Some(Snapshot::file_diff(file, diff))
            }
            Accumulator::Open { file, .. } => {
                trace!(file = %file, "Visit left file unchanged, nothing to flush");
                None
            }
            Accumulator::Closed => None,
        }
    }

    /// Drop any open accumulation without emitting it.
    pub fn discard(&mut self) {
        self.accumulator = Accumulator::Closed;
    }
}
