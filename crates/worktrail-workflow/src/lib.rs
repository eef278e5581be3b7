//! Narrated workflow documents.
//!
//! The [`WorkflowSynthesizer`] turns a finished snapshot list into a
//! markdown document by asking a language model why each step happened,
//! what the whole session accomplished, and what to call the result. The
//! [`WorkflowFinder`] goes the other way: given a task, it picks the saved
//! workflow most likely to help.

mod cancel;
pub mod clip;
pub mod error;
pub mod finder;
pub mod naming;
pub mod prompts;
pub mod synthesizer;

pub use clip::clip_max_lines;
pub use error::{Result, WorkflowError};
pub use finder::{CHOOSE_TOOL, FindOutcome, FinderConfig, WorkflowFile, WorkflowFinder, read_workflows};
pub use naming::{NAME_TOOL, fallback_name, name_workflow};
pub use synthesizer::{Synthesis, SynthesizerConfig, WorkflowSynthesizer};

pub use tokio_util::sync::CancellationToken;
