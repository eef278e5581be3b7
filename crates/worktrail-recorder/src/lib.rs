//! Turns a noisy stream of editor events into an ordered list of snapshots.
//!
//! ```text
//!  EditorEvent ──► Recorder ──► ChangeTracker ──► Session (snapshots)
//!                    │              │
//!                    │              ├─ reconstruct: pre-change text
//!                    │              └─ diff: unified patch per file visit
//!                    └─ PathFilter: scheme, ignore globs, relative paths
//! ```
//!
//! The [`ChangeTracker`] is a pure state machine; the [`Recorder`] gates it
//! on the session's recording flag and feeds what it emits into the
//! [`Session`](worktrail_session::Session).

pub mod diff;
pub mod error;
pub mod paths;
pub mod reconstruct;
pub mod recorder;
pub mod tracker;

pub use diff::unified_diff;
pub use error::{RecorderError, Result};
pub use paths::PathFilter;
pub use reconstruct::content_before_change;
pub use recorder::Recorder;
pub use tracker::ChangeTracker;
