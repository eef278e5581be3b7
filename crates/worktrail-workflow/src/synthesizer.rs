//! Turning a recorded snapshot list into a narrated workflow document.
//!
//! The [`WorkflowSynthesizer`] makes one narration round trip per snapshot,
//! one for the overall summary, and one to name the document. Progress and
//! the processing flag are published through the [`Session`] when one is
//! attached.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use worktrail_llm::{CompletionRequest, Message, SharedBackend};
use worktrail_session::Session;
use worktrail_types::{Document, Snapshot};

use crate::cancel::complete_or_cancel;
use crate::naming::{fallback_name, name_workflow};
use crate::prompts::{
    NARRATION_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT, narration_prompt, render_document,
    summary_prompt,
};
use crate::{Result, WorkflowError};

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for workflow synthesis.
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    /// Model to narrate with.
    pub model: String,
    /// Max tokens for each step's narration.
    pub max_narration_tokens: u32,
    /// Max tokens for the overall summary.
    pub max_summary_tokens: u32,
    /// Max tokens for the naming call.
    pub max_name_tokens: u32,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_narration_tokens: 512,
            max_summary_tokens: 1024,
            max_name_tokens: 64,
        }
    }
}

/// Outcome of a synthesis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    /// A finished document, ready to persist.
    Document(Document),
    /// There was nothing to narrate.
    Empty,
    /// The run was cancelled before it finished.
    Cancelled,
    /// Narration failed; nothing should be saved.
    Failed(String),
}

impl Synthesis {
    pub fn document(&self) -> Option<&Document> {
        match self {
            Synthesis::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            Synthesis::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Synthesis::Cancelled)
    }
}

/// Resets the session's processing flag and progress when synthesis ends,
/// however it ends.
struct ProcessingGuard<'a> {
    session: Option<&'a Session>,
}

impl<'a> ProcessingGuard<'a> {
    fn begin(session: Option<&'a Session>) -> Self {
        if let Some(session) = session {
            session.set_progress(0.0);
            session.set_processing(true);
        }
        Self { session }
    }

    fn progress(&self, done: usize, total: usize) {
        if let Some(session) = self.session {
            session.set_progress(done as f32 / total as f32);
        }
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session {
            session.set_processing(false);
            session.set_progress(0.0);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WorkflowSynthesizer
// ─────────────────────────────────────────────────────────────────────────────

/// Narrates snapshot lists into workflow documents.
pub struct WorkflowSynthesizer {
    backend: SharedBackend,
    config: SynthesizerConfig,
    session: Option<Session>,
}

impl WorkflowSynthesizer {
    pub fn new(backend: SharedBackend, config: SynthesizerConfig) -> Self {
        Self {
            backend,
            config,
            session: None,
        }
    }

    /// Publish processing state and progress on `session`.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Synthesize a document from `snapshots`.
    pub async fn synthesize(&self, snapshots: &[Snapshot]) -> Synthesis {
        self.synthesize_with_cancel(snapshots, &CancellationToken::new())
            .await
    }

    /// Synthesize a document. Cancelling `cancel` stops the run at once,
    /// including a round trip that is already in flight.
    pub async fn synthesize_with_cancel(
        &self,
        snapshots: &[Snapshot],
        cancel: &CancellationToken,
    ) -> Synthesis {
        if snapshots.is_empty() {
            debug!("No snapshots to synthesize");
            return Synthesis::Empty;
        }

        let guard = ProcessingGuard::begin(self.session.as_ref());
        info!(
            snapshots = snapshots.len(),
            backend = self.backend.name(),
            "Synthesizing workflow"
        );

        match self.run(snapshots, cancel, &guard).await {
            Ok(doc) => {
                info!(filename = %doc.filename, "Workflow synthesized");
                Synthesis::Document(doc)
            }
            Err(WorkflowError::Cancelled) => {
                info!("Workflow synthesis cancelled");
                Synthesis::Cancelled
            }
            Err(e) => {
                warn!(error = %e, "Workflow synthesis failed");
                Synthesis::Failed(e.to_string())
            }
        }
    }

    async fn run(
        &self,
        snapshots: &[Snapshot],
        cancel: &CancellationToken,
        guard: &ProcessingGuard<'_>,
    ) -> Result<Document> {
        // One narration per snapshot, then the summary, then the name
        let total = snapshots.len() + 2;
        let mut narrations = Vec::with_capacity(snapshots.len());
        let mut headlines = Vec::with_capacity(snapshots.len());

        for (index, snapshot) in snapshots.iter().enumerate() {
            check_cancelled(cancel)?;
            debug!(step = index + 1, snapshot = %snapshot.headline(), "Narrating step");

            let prompt = narration_prompt(index, snapshots.len(), snapshot, &headlines);
            let narration = self
                .ask(NARRATION_SYSTEM_PROMPT, prompt, self.config.max_narration_tokens, cancel)
                .await?;

            narrations.push(narration);
            headlines.push(snapshot.headline());
            guard.progress(index + 1, total);
        }

        let steps: Vec<(&Snapshot, &str)> = snapshots
            .iter()
            .zip(narrations.iter().map(String::as_str))
            .collect();

        check_cancelled(cancel)?;
        let summary = self
            .ask(
                SUMMARY_SYSTEM_PROMPT,
                summary_prompt(&steps),
                self.config.max_summary_tokens,
                cancel,
            )
            .await?;
        guard.progress(snapshots.len() + 1, total);

        let content = render_document(&summary, &steps);

        check_cancelled(cancel)?;
        let name = match name_workflow(
            self.backend.as_ref(),
            &self.config.model,
            self.config.max_name_tokens,
            &summary,
            cancel,
        )
        .await
        {
            Ok(name) => name,
            Err(WorkflowError::Cancelled) => return Err(WorkflowError::Cancelled),
            Err(e) => {
                let name = fallback_name(chrono::Local::now());
                warn!(error = %e, fallback = %name, "Naming failed, using timestamp");
                name
            }
        };
        guard.progress(total, total);

        Ok(Document::new(content, &name))
    }

    async fn ask(
        &self,
        system: &str,
        prompt: String,
        max_tokens: u32,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let request = CompletionRequest::new(
            &self.config.model,
            vec![Message::user(prompt)],
            max_tokens,
        )
        .with_system(system);

        let response = complete_or_cancel(self.backend.as_ref(), request, cancel).await?;
        Ok(response.text().trim().to_string())
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(WorkflowError::Cancelled)
    } else {
        Ok(())
    }
}
