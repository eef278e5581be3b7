//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [llm]          # narration backend
//! [workflow]     # synthesis limits and the document folder
//! [recording]    # ignored paths
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorktrailConfig {
    /// Narration backend (the `[llm]` section).
    pub llm: Option<LlmConfig>,

    /// Workflow synthesis configuration.
    pub workflow: Option<WorkflowConfig>,

    /// Recording configuration.
    pub recording: Option<RecordingConfig>,
}

impl WorktrailConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole, not field by field.
    pub fn merge(&mut self, other: WorktrailConfig) {
        if other.llm.is_some() {
            self.llm = other.llm;
        }
        if other.workflow.is_some() {
            self.workflow = other.workflow;
        }
        if other.recording.is_some() {
            self.recording = other.recording;
        }
    }

    /// The `[llm]` section, or defaults if absent.
    pub fn llm_or_default(&self) -> LlmConfig {
        self.llm.clone().unwrap_or_default()
    }

    /// The `[workflow]` section, or defaults if absent.
    pub fn workflow_or_default(&self) -> WorkflowConfig {
        self.workflow.clone().unwrap_or_default()
    }

    /// The `[recording]` section, or defaults if absent.
    pub fn recording_or_default(&self) -> RecordingConfig {
        self.recording.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LLM Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the narration backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend provider.
    pub backend: Option<Backend>,
    /// Model identifier.
    pub model: Option<String>,
    /// Custom API base URL (for proxies, custom endpoints).
    pub base_url: Option<String>,
    /// API key (prefer an env var; warns if set here).
    pub api_key: Option<String>,
    /// Maximum retry attempts for failed requests.
    pub retry_max: Option<u32>,
    /// Backoff delay between retries in milliseconds.
    pub retry_backoff_ms: Option<u64>,
}

impl LlmConfig {
    /// Returns true if an API key is stored directly in the config file.
    pub fn has_plaintext_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Configured backend, defaulting to OpenAI.
    pub fn effective_backend(&self) -> Backend {
        self.backend.unwrap_or(Backend::Openai)
    }

    /// Configured model, or the backend's default.
    pub fn effective_model(&self) -> Option<String> {
        self.model
            .clone()
            .or_else(|| self.effective_backend().default_model().map(str::to_string))
    }
}

/// Supported narration backend providers.
///
/// All of them speak the OpenAI chat-completions protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Openai,
    Groq,
    Ollama,
    Custom,
}

impl Backend {
    /// Environment variable name for this backend's API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            Backend::Openai => "OPENAI_API_KEY",
            Backend::Groq => "GROQ_API_KEY",
            Backend::Ollama => "OLLAMA_API_KEY",
            Backend::Custom => "LLM_API_KEY",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Openai => "OpenAI",
            Backend::Groq => "Groq",
            Backend::Ollama => "Ollama",
            Backend::Custom => "Custom",
        }
    }

    /// Model used when the config names none.
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Backend::Openai => Some("gpt-4o-mini"),
            Backend::Groq => Some("llama-3.1-8b-instant"),
            Backend::Ollama => Some("llama3.2"),
            Backend::Custom => None,
        }
    }

    /// Whether requests must carry an API key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Backend::Ollama)
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflow Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default folder for workflow documents, relative to the workspace root.
pub const DEFAULT_OUTPUT_DIR: &str = ".worktrail";

/// Workflow synthesis configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Max tokens for each step's narration.
    pub max_narration_tokens: u32,
    /// Max tokens for the overall summary.
    pub max_summary_tokens: u32,
    /// Folder for workflow documents. Relative paths resolve against the
    /// workspace root.
    pub output_dir: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_narration_tokens: 512,
            max_summary_tokens: 1024,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl WorkflowConfig {
    /// Resolve the output folder for a workspace.
    pub fn output_dir_in(&self, workspace_root: &std::path::Path) -> PathBuf {
        if self.output_dir.is_absolute() {
            self.output_dir.clone()
        } else {
            workspace_root.join(&self.output_dir)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Recording configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Glob patterns for paths left out of recordings.
    pub ignore: Vec<String>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            // The document folder would otherwise record its own output
            ignore: vec![format!("{}/**", DEFAULT_OUTPUT_DIR)],
        }
    }
}
