//! Narration backends for worktrail.
//!
//! The recorder asks a language model to explain each recorded change, to
//! summarize the whole session, and to pick names and files through tool
//! calls. This crate defines the provider-agnostic surface for that.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  LlmBackend trait                       │
//! │  - complete() -> CompletionResponse     │
//! └─────────────────────────────────────────┘
//!                    │
//!          ┌─────────┴─────────┐
//!          ▼                   ▼
//!   ┌──────────────┐    ┌─────────────┐
//!   │ OpenAiBackend│    │ MockBackend │
//!   │ (OpenAI/Groq/│    │  (tests)    │
//!   │  Ollama/...) │    └─────────────┘
//!   └──────────────┘
//! ```

pub mod backend;
pub mod error;
pub mod openai;
pub mod types;

pub use backend::{LlmBackend, MockBackend, SharedBackend, with_retry};
pub use error::{LlmError, Result};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, Role, StopReason, ToolChoice,
    ToolDefinition, Usage,
};
