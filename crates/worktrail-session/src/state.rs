//! Session state shared between the recorder, the synthesizer, and observers.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};
use uuid::Uuid;
use worktrail_types::Snapshot;

use crate::listener::{Listener, ListenerRegistry, SubscriptionId};

/// A change to the session, delivered to every listener.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Recording began; the snapshot buffer was cleared.
    RecordingStarted { recording_id: Uuid },
    /// Recording ended and the buffer was detached.
    RecordingStopped {
        recording_id: Option<Uuid>,
        snapshot_count: usize,
    },
    /// A snapshot was appended at `index`.
    SnapshotPushed { index: usize },
    /// The synthesizer started or stopped working.
    ProcessingChanged { is_processing: bool },
    /// Synthesis progress moved.
    ProgressChanged { progress: f32 },
}

/// Point-in-time view of the session handed to listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub recording_id: Option<Uuid>,
    pub is_recording: bool,
    pub snapshot_count: usize,
    pub is_processing: bool,
    pub progress: f32,
}

#[derive(Debug, Default)]
struct SessionState {
    recording_id: Option<Uuid>,
    is_recording: bool,
    snapshots: Vec<Snapshot>,
    is_processing: bool,
    progress: f32,
}

impl SessionState {
    fn view(&self) -> SessionView {
        SessionView {
            recording_id: self.recording_id,
            is_recording: self.is_recording,
            snapshot_count: self.snapshots.len(),
            is_processing: self.is_processing,
            progress: self.progress,
        }
    }
}

#[derive(Default)]
struct SessionInner {
    state: RwLock<SessionState>,
    listeners: Mutex<ListenerRegistry>,
}

/// Observable recording session.
///
/// Cloning is cheap; clones share the same state and listeners. State locks
/// are released before listeners run, so a listener may read the session it
/// is observing.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("view", &self.view())
            .field("listeners", &self.inner.listeners.lock().len())
            .finish()
    }
}

impl Session {
    /// Create an idle session with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Observers
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a listener. It is called after every subsequent mutation.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent, &SessionView) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        self.inner.listeners.lock().add(listener)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.lock().remove(id)
    }

    fn notify(&self, event: SessionEvent, view: SessionView) {
        let listeners = self.inner.listeners.lock().listeners();
        trace!(?event, listeners = listeners.len(), "Notifying session listeners");
        for listener in listeners {
            listener(&event, &view);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Recording
    // ─────────────────────────────────────────────────────────────────────────

    /// Begin a new recording, discarding any buffered snapshots.
    pub fn start_recording(&self) -> Uuid {
        let recording_id = Uuid::new_v4();
        let view = {
            let mut state = self.inner.state.write();
            state.recording_id = Some(recording_id);
            state.is_recording = true;
            state.snapshots.clear();
            state.view()
        };
        debug!(recording_id = %recording_id, "Recording started");
        self.notify(SessionEvent::RecordingStarted { recording_id }, view);
        recording_id
    }

    /// End the recording and detach the snapshot buffer.
    ///
    /// The returned sequence is owned by the caller; the session keeps
    /// nothing. Calling this again without a new recording returns an empty
    /// sequence.
    pub fn stop_recording(&self) -> Vec<Snapshot> {
        let (snapshots, recording_id, view) = {
            let mut state = self.inner.state.write();
            state.is_recording = false;
            let snapshots = std::mem::take(&mut state.snapshots);
            (snapshots, state.recording_id.take(), state.view())
        };
        debug!(
            recording_id = ?recording_id,
            snapshot_count = snapshots.len(),
            "Recording stopped"
        );
        self.notify(
            SessionEvent::RecordingStopped {
                recording_id,
                snapshot_count: snapshots.len(),
            },
            view,
        );
        snapshots
    }

    /// Append a snapshot to the buffer.
    pub fn push_snapshot(&self, snapshot: Snapshot) {
        let (index, view) = {
            let mut state = self.inner.state.write();
            state.snapshots.push(snapshot);
            (state.snapshots.len() - 1, state.view())
        };
        trace!(index, "Snapshot pushed");
        self.notify(SessionEvent::SnapshotPushed { index }, view);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Processing
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the processing flag. No notification if the value is unchanged.
    pub fn set_processing(&self, is_processing: bool) {
        let view = {
            let mut state = self.inner.state.write();
            if state.is_processing == is_processing {
                return;
            }
            state.is_processing = is_processing;
            state.view()
        };
        self.notify(SessionEvent::ProcessingChanged { is_processing }, view);
    }

    /// Set synthesis progress, clamped to `[0, 1]`.
    pub fn set_progress(&self, progress: f32) {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        let view = {
            let mut state = self.inner.state.write();
            if state.progress == progress {
                return;
            }
            state.progress = progress;
            state.view()
        };
        self.notify(SessionEvent::ProgressChanged { progress }, view);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_recording(&self) -> bool {
        self.inner.state.read().is_recording
    }

    pub fn is_processing(&self) -> bool {
        self.inner.state.read().is_processing
    }

    pub fn progress(&self) -> f32 {
        self.inner.state.read().progress
    }

    /// Copy of the buffered snapshots, in emission order.
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.inner.state.read().snapshots.clone()
    }

    pub fn snapshot_count(&self) -> usize {
        self.inner.state.read().snapshots.len()
    }

    /// Current state as a [`SessionView`].
    pub fn view(&self) -> SessionView {
        self.inner.state.read().view()
    }
}
