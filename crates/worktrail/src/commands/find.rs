//! Find command - look up a saved workflow for a task.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::Style;
use worktrail_workflow::{CancellationToken, FindOutcome, FinderConfig, WorkflowFinder, read_workflows};

use super::{Context, workspace_root};
use crate::backend::build_backend;

/// Arguments for the find command.
#[derive(Args, Debug)]
pub struct FindArgs {
    /// What you want to accomplish
    #[arg(required = true, num_args = 1..)]
    pub task: Vec<String>,

    /// Workspace root (defaults to the current directory)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,
}

/// Run the find command.
pub async fn run(args: FindArgs, ctx: &Context) -> Result<()> {
    let task = args.task.join(" ");
    let root = workspace_root(args.workspace.as_deref())?;
    let loaded = worktrail_config::load_config(Some(&root))?;
    let folder = loaded.config.workflow_or_default().output_dir_in(&root);

    // Skip backend setup when there is nothing to choose from
    let outcome = if read_workflows(&folder, Some(&root))?.is_empty() {
        FindOutcome::NoWorkflows
    } else {
        let (backend, model) = build_backend(&loaded.config.llm_or_default())?;
        let finder = WorkflowFinder::new(
            backend,
            FinderConfig {
                model,
                ..Default::default()
            },
        )
        .with_workspace_root(&root);

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });
        let outcome = finder.find(&task, &folder, &cancel).await;
        interrupt.abort();
        outcome?
    };

    print_outcome(&outcome, ctx);
    Ok(())
}

fn print_outcome(outcome: &FindOutcome, ctx: &Context) {
    if ctx.json_output {
        let (status, path) = match outcome {
            FindOutcome::Found { path, .. } => ("found", Some(path)),
            FindOutcome::NoWorkflows => ("no_workflows", None),
            FindOutcome::NoMatch => ("no_match", None),
            FindOutcome::Empty(path) => ("empty", Some(path)),
            FindOutcome::Unreadable(path) => ("unreadable", Some(path)),
            FindOutcome::Cancelled => ("cancelled", None),
        };
        let value = serde_json::json!({
            "status": status,
            "path": path.map(|p| p.display().to_string()),
            "message": outcome.message(),
        });
        println!("{}", value);
        return;
    }

    match outcome {
        FindOutcome::Found { path, document } => {
            let dim = Style::new().dim();
            println!("{}", dim.apply_to(format!("# {}", path.display())));
            println!("{}", document.content.trim_end());
        }
        other => {
            let yellow = Style::new().yellow();
            eprintln!("{}", yellow.apply_to(other.message()));
        }
    }
}
