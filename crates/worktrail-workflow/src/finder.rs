//! Finding a saved workflow that fits a task.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use worktrail_llm::{CompletionRequest, Message, SharedBackend, ToolChoice, ToolDefinition};
use worktrail_types::{DOCUMENT_EXTENSION, Document};

use crate::cancel::complete_or_cancel;
use crate::clip::clip_max_lines;
use crate::prompts::FINDER_SYSTEM_PROMPT;
use crate::{Result, WorkflowError};

/// Tool the model calls with its pick.
pub const CHOOSE_TOOL: &str = "choose_file";

/// Lines of each workflow shown to the model.
const PREVIEW_LINES: usize = 2;

/// Configuration for workflow lookup.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    pub model: String,
    pub max_tokens: u32,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 256,
        }
    }
}

/// A saved workflow document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowFile {
    pub path: PathBuf,
    /// Path shown to the model, relative to the workspace when possible.
    pub display_path: String,
    pub content: String,
}

/// Read every workflow document in `folder`, sorted by path.
///
/// A missing folder has no workflows. Files that cannot be read as UTF-8 are
/// skipped.
pub fn read_workflows(folder: &Path, workspace_root: Option<&Path>) -> Result<Vec<WorkflowFile>> {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(WorkflowError::Io {
                path: folder.to_path_buf(),
                source: e,
            });
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION))
        .collect();
    paths.sort();

    let mut workflows = Vec::with_capacity(paths.len());
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(content) => workflows.push(WorkflowFile {
                display_path: display_path(&path, workspace_root),
                path,
                content,
            }),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable workflow"),
        }
    }
    Ok(workflows)
}

fn display_path(path: &Path, workspace_root: Option<&Path>) -> String {
    workspace_root
        .and_then(|root| path.strip_prefix(root).ok())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Result of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindOutcome {
    /// The model picked a workflow.
    Found { path: PathBuf, document: Document },
    /// The folder holds no workflow documents.
    NoWorkflows,
    /// None of the workflows fit the task.
    NoMatch,
    /// The chosen file is empty.
    Empty(PathBuf),
    /// The chosen file could not be read back.
    Unreadable(PathBuf),
    Cancelled,
}

impl FindOutcome {
    /// Message suitable for handing to a user or an agent.
    pub fn message(&self) -> String {
        match self {
            FindOutcome::Found { document, .. } => format!(
                "Use this workflow to accomplish the task:\n```markdown\n{}\n```",
                document.content.trim_end()
            ),
            FindOutcome::NoWorkflows => "Error: No workflows found. Record a workflow with \
                `worktrail replay` before looking one up."
                .to_string(),
            FindOutcome::NoMatch => {
                "Error: No workflow file found that would satisfy the request. Record a workflow first."
                    .to_string()
            }
            FindOutcome::Empty(path) => {
                format!("Error: The workflow file in {} is empty.", path.display())
            }
            FindOutcome::Unreadable(path) => {
                format!("Error: Could not read the workflow file in {}.", path.display())
            }
            FindOutcome::Cancelled => "Error: The request was cancelled.".to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, FindOutcome::Found { .. })
    }
}

fn choose_tool() -> ToolDefinition {
    ToolDefinition::new(
        CHOOSE_TOOL,
        "Return the path of the workspace file that best satisfies the user request.",
        json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "The path to the file that should be used"
                }
            },
            "required": ["filePath"]
        }),
    )
}

fn finder_prompt(task: &str, workflows: &[WorkflowFile]) -> String {
    let mut prompt = format!(
        "The user wants to accomplish the following task: {}\n\
         Which workflow file should the user use to accomplish this task?\n",
        task.trim()
    );
    for workflow in workflows {
        prompt.push_str(&format!(
            "\nWorkflow file: {}\nContent:\n{}\n",
            workflow.display_path,
            clip_max_lines(&workflow.content, PREVIEW_LINES)
        ));
    }
    let options: Vec<&str> = workflows.iter().map(|w| w.display_path.as_str()).collect();
    // Serializing a list of strings cannot fail
    let options = serde_json::to_string_pretty(&options).unwrap_or_default();
    prompt.push_str(&format!(
        "\nOutput the path of the file you want to use. Your options are:\n```json\n{}\n```",
        options
    ));
    prompt
}

/// Picks the saved workflow that best fits a task.
pub struct WorkflowFinder {
    backend: SharedBackend,
    config: FinderConfig,
    workspace_root: Option<PathBuf>,
}

impl WorkflowFinder {
    pub fn new(backend: SharedBackend, config: FinderConfig) -> Self {
        Self {
            backend,
            config,
            workspace_root: None,
        }
    }

    /// Show workflow paths relative to this root.
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Ask the model which workflow in `folder` helps with `task`.
    pub async fn find(&self, task: &str, folder: &Path, cancel: &CancellationToken) -> Result<FindOutcome> {
        let workflows = read_workflows(folder, self.workspace_root.as_deref())?;
        if workflows.is_empty() {
            debug!(folder = %folder.display(), "No workflow documents");
            return Ok(FindOutcome::NoWorkflows);
        }
        if cancel.is_cancelled() {
            return Ok(FindOutcome::Cancelled);
        }

        info!(task, candidates = workflows.len(), "Looking up workflow");
        let request = CompletionRequest::new(
            &self.config.model,
            vec![Message::user(finder_prompt(task, &workflows))],
            self.config.max_tokens,
        )
        .with_system(FINDER_SYSTEM_PROMPT)
        .with_tools(vec![choose_tool()])
        .with_tool_choice(ToolChoice::Auto);

        let response = match complete_or_cancel(self.backend.as_ref(), request, cancel).await {
            Ok(response) => response,
            Err(WorkflowError::Cancelled) => return Ok(FindOutcome::Cancelled),
            Err(e) => return Err(e),
        };

        let chosen = response
            .tool_input(CHOOSE_TOOL)
            .and_then(|input| input.get("filePath"))
            .and_then(|path| path.as_str())
            .map(str::trim)
            .filter(|path| !path.is_empty());

        let Some(chosen) = chosen else {
            debug!("Model did not choose a workflow");
            return Ok(FindOutcome::NoMatch);
        };

        // Only files that were offered can be returned
        let Some(workflow) = workflows.iter().find(|w| w.display_path == chosen) else {
            warn!(chosen, "Model chose a file that was not offered");
            return Ok(FindOutcome::NoMatch);
        };

        Ok(load_chosen(&workflow.path))
    }
}

fn load_chosen(path: &Path) -> FindOutcome {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read chosen workflow");
            return FindOutcome::Unreadable(path.to_path_buf());
        }
    };
    if content.trim().is_empty() {
        return FindOutcome::Empty(path.to_path_buf());
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(path = %path.display(), "Found workflow");
    FindOutcome::Found {
        path: path.to_path_buf(),
        document: Document::new(content, &stem),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use worktrail_llm::MockBackend;

    fn workspace() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join(".worktrail");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("setup-db.md"), "# Set up the database\n\nRun migrations.\nThen seed.\n").unwrap();
        fs::write(folder.join("add-endpoint.md"), "# Add an endpoint\n\nEdit routes.\n").unwrap();
        fs::write(folder.join("notes.txt"), "not a workflow").unwrap();
        (dir, folder)
    }

    fn finder(backend: Arc<MockBackend>, root: &Path) -> WorkflowFinder {
        WorkflowFinder::new(backend, FinderConfig::default()).with_workspace_root(root)
    }

    #[test]
    fn test_read_workflows_filters_and_sorts() {
        let (dir, folder) = workspace();
        let workflows = read_workflows(&folder, Some(dir.path())).unwrap();

        let names: Vec<&str> = workflows.iter().map(|w| w.display_path.as_str()).collect();
        assert_eq!(names, vec![".worktrail/add-endpoint.md", ".worktrail/setup-db.md"]);
    }

    #[test]
    fn test_read_workflows_missing_folder() {
        let dir = TempDir::new().unwrap();
        assert!(read_workflows(&dir.path().join("nope"), None).unwrap().is_empty());
    }

    #[test]
    fn test_prompt_lists_previews_and_options() {
        let (dir, folder) = workspace();
        let workflows = read_workflows(&folder, Some(dir.path())).unwrap();
        let prompt = finder_prompt("seed the database", &workflows);

        assert!(prompt.contains("task: seed the database"));
        assert!(prompt.contains("Workflow file: .worktrail/setup-db.md\nContent:\n# Set up the database\n\n"));
        assert!(!prompt.contains("Run migrations."));
        assert!(prompt.contains("```json\n[\n  \".worktrail/add-endpoint.md\",\n  \".worktrail/setup-db.md\"\n]\n```"));
    }

    #[tokio::test]
    async fn test_found() {
        let (dir, folder) = workspace();
        let backend = Arc::new(
            MockBackend::default().then_tool_call(CHOOSE_TOOL, json!({"filePath": ".worktrail/setup-db.md"})),
        );

        let outcome = finder(backend.clone(), dir.path())
            .find("seed the database", &folder, &CancellationToken::new())
            .await
            .unwrap();

        match &outcome {
            FindOutcome::Found { path, document } => {
                assert_eq!(path, &folder.join("setup-db.md"));
                assert_eq!(document.filename, "setup-db");
                assert!(document.content.contains("Then seed."));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(outcome.message().starts_with("Use this workflow to accomplish the task:\n```markdown\n# Set up"));

        let request = &backend.requests()[0];
        assert_eq!(request.tools[0].name, CHOOSE_TOOL);
    }

    #[tokio::test]
    async fn test_no_workflows_makes_no_call() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MockBackend::default());

        let outcome = finder(backend.clone(), dir.path())
            .find("anything", &dir.path().join(".worktrail"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, FindOutcome::NoWorkflows);
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_no_tool_call_is_no_match() {
        let (dir, folder) = workspace();
        let backend = Arc::new(MockBackend::with_text("None of these fit."));

        let outcome = finder(backend, dir.path())
            .find("deploy to prod", &folder, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, FindOutcome::NoMatch);
    }

    #[tokio::test]
    async fn test_unoffered_path_is_no_match() {
        let (dir, folder) = workspace();
        let backend = Arc::new(MockBackend::default().then_tool_call(CHOOSE_TOOL, json!({"filePath": "/etc/passwd"})));

        let outcome = finder(backend, dir.path())
            .find("anything", &folder, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, FindOutcome::NoMatch);
    }

    #[tokio::test]
    async fn test_empty_workflow() {
        let (dir, folder) = workspace();
        fs::write(folder.join("blank.md"), "  \n").unwrap();
        let backend = Arc::new(MockBackend::default().then_tool_call(CHOOSE_TOOL, json!({"filePath": ".worktrail/blank.md"})));

        let outcome = finder(backend, dir.path())
            .find("anything", &folder, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, FindOutcome::Empty(folder.join("blank.md")));
        assert!(outcome.message().contains("is empty"));
    }

    #[tokio::test]
    async fn test_cancelled() {
        let (dir, folder) = workspace();
        let backend = Arc::new(MockBackend::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = finder(backend.clone(), dir.path())
            .find("anything", &folder, &cancel)
            .await
            .unwrap();
        assert_eq!(outcome, FindOutcome::Cancelled);
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_request_in_flight() {
        let (dir, folder) = workspace();
        let backend = Arc::new(
            MockBackend::default()
                .then_tool_call(CHOOSE_TOOL, json!({"filePath": ".worktrail/setup-db.md"}))
                .with_delay(Duration::from_secs(30)),
        );
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let started = tokio::time::Instant::now();
        let outcome = finder(backend.clone(), dir.path())
            .find("seed the database", &folder, &cancel)
            .await
            .unwrap();

        assert_eq!(outcome, FindOutcome::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let (dir, folder) = workspace();
        let backend = Arc::new(MockBackend::default().then_error("offline"));

        let err = finder(backend, dir.path())
            .find("anything", &folder, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Llm(_)));
    }

    #[test]
    fn test_unreadable_chosen_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.md");
        assert_eq!(load_chosen(&missing), FindOutcome::Unreadable(missing.clone()));
    }
}
