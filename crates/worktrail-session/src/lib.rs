//! Observable recording session state.
//!
//! A [`Session`] holds the recording flag, the ordered snapshot buffer, and
//! the synthesis progress indicators. Dependents subscribe to it and are
//! notified synchronously, in subscription order, after every mutation.
//!
//! # Example
//!
//! ```rust,ignore
//! use worktrail_session::{Session, SessionEvent};
//!
//! let session = Session::new();
//! let _sub = session.subscribe(|event, state| {
//!     if let SessionEvent::SnapshotPushed { .. } = event {
//!         println!("{} snapshots", state.snapshot_count);
//!     }
//! });
//! session.start_recording();
//! ```

mod listener;
mod state;

pub use listener::{Listener, SubscriptionId};
pub use state::{Session, SessionEvent, SessionView};
