//! Shared types for the worktrail session recorder.
//!
//! Everything that crosses a crate boundary lives here: the [`Snapshot`]
//! records produced while recording, the [`EditorEvent`] stream consumed by
//! the recorder, and the [`Document`] handed to the persistence layer.

pub mod document;
pub mod error;
pub mod event;
pub mod snapshot;

pub use document::{DOCUMENT_EXTENSION, Document, DocumentSink, slugify};
pub use error::{Error, Result};
pub use event::{EditorEvent, FILE_SCHEME, TextEdit};
pub use snapshot::{FileActionKind, Snapshot};
