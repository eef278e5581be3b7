//! Recording orchestration.

use tracing::{debug, trace};
use uuid::Uuid;
use worktrail_session::Session;
use worktrail_types::{EditorEvent, Snapshot};

use crate::paths::PathFilter;
use crate::tracker::ChangeTracker;

/// Feeds editor events through a [`ChangeTracker`] into a [`Session`].
///
/// Events arriving while the session is not recording are dropped, except
/// that command start/end still update whether a command is running so
/// that a command already in flight when recording starts keeps its output
/// out of the recording.
#[derive(Debug)]
pub struct Recorder {
    session: Session,
    tracker: ChangeTracker,
    filter: PathFilter,
}

impl Recorder {
    /// Create a recorder writing into `session`.
    pub fn new(session: Session) -> Self {
        Self {
            session,
            tracker: ChangeTracker::new(),
            filter: PathFilter::new(),
        }
    }

    /// Use `filter` for path naming and ignore rules.
    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_recording()
    }

    /// Start a fresh recording.
    pub fn start_recording(&mut self) -> Uuid {
        self.tracker.discard();
        self.session.start_recording()
    }

    /// Stop recording and hand back every snapshot, in order.
    ///
    /// Any open edit is flushed first. A second call returns nothing.
    pub fn stop_recording(&mut self) -> Vec<Snapshot> {
        if self.session.is_recording()
            && let Some(snapshot) = self.tracker.flush()
        {
            self.session.push_snapshot(snapshot);
        }
        self.tracker.discard();
        self.session.stop_recording()
    }

    /// Process a single editor event.
    pub fn handle(&mut self, event: EditorEvent) {
        let recording = self.session.is_recording();
        if !event.is_file_backed() {
            trace!(?event, "Ignoring non-file document");
            return;
        }

        match event {
            EditorEvent::TextChange {
                file, text, edits, ..
            } => {
                if !recording {
                    return;
                }
                let file = self.filter.relative(&file);
                if self.filter.is_ignored(&file) {
                    trace!(file = %file, "Ignoring edit to ignored path");
                    return;
                }
                let flushed = self.tracker.on_text_change(&file, &text, &edits);
                self.emit(flushed);
            }
            EditorEvent::CommandStart { command, .. } => {
                let flushed = self.tracker.on_command_start();
                if recording {
                    debug!(command = %command, "Command started");
                    self.emit(flushed);
                }
            }
            EditorEvent::CommandEnd { command, cwd } => {
                let snapshot = self.tracker.on_command_end(command, cwd);
                if recording {
                    debug!(snapshot = %snapshot.headline(), "Command ended");
                    self.emit(Some(snapshot));
                }
            }
            EditorEvent::FileAction {
                action,
                file,
                old_file,
            } => {
                if !recording {
                    return;
                }
                let file = self.filter.relative(&file);
                let old_file = old_file.map(|old| self.filter.relative(&old));
                let old_ignored = old_file.as_deref().is_none_or(|old| self.filter.is_ignored(old));
                if self.filter.is_ignored(&file) && old_ignored {
                    trace!(file = %file, "Ignoring file action on ignored path");
                    return;
                }
                debug!(action = %action, file = %file, "File action");
                for snapshot in self.tracker.on_file_action(action, file, old_file) {
                    self.session.push_snapshot(snapshot);
                }
            }
        }
    }

    /// Process events in order.
    pub fn handle_all<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = EditorEvent>,
    {
        for event in events {
            self.handle(event);
        }
    }

    fn emit(&self, snapshot: Option<Snapshot>) {
        if let Some(snapshot) = snapshot {
            self.session.push_snapshot(snapshot);
        }
    }
}
