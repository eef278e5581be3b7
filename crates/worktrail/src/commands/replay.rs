//! Replay command - feed an editor event log through the recorder.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::Args;
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use worktrail_recorder::{PathFilter, Recorder};
use worktrail_session::{Session, SessionEvent};
use worktrail_types::{DocumentSink, EditorEvent, Snapshot};
use worktrail_workflow::{CancellationToken, Synthesis, SynthesizerConfig, WorkflowSynthesizer};

use super::{Context, workspace_root};
use crate::backend::build_backend;
use crate::sink::FolderSink;

/// Arguments for the replay command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON-lines file of editor events
    #[arg(required = true)]
    pub events: PathBuf,

    /// Workspace root (defaults to the current directory)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Print the recorded snapshots instead of narrating them
    #[arg(long)]
    pub no_narrate: bool,
}

/// Run the replay command.
pub async fn run(args: ReplayArgs, ctx: &Context) -> Result<()> {
    let root = workspace_root(args.workspace.as_deref())?;
    let loaded = worktrail_config::load_config(Some(&root))?;
    let config = &loaded.config;

    let filter = PathFilter::new()
        .with_workspace_root(&root)
        .with_ignore_patterns(config.recording_or_default().ignore)?;

    let events = read_event_log(&args.events)?;
    tracing::info!(events = events.len(), path = %args.events.display(), "Replaying event log");

    let session = Session::new();
    let mut recorder = Recorder::new(session.clone()).with_filter(filter);
    recorder.start_recording();
    recorder.handle_all(events);
    let snapshots = recorder.stop_recording();

    if args.no_narrate {
        return print_snapshots(&snapshots, ctx);
    }

    if snapshots.is_empty() {
        report(ctx, "empty", None, "Nothing was recorded, no workflow to write.");
        return Ok(());
    }

    let (backend, model) = build_backend(&config.llm_or_default())?;
    let workflow = config.workflow_or_default();
    let synthesizer = WorkflowSynthesizer::new(
        backend,
        SynthesizerConfig {
            model,
            max_narration_tokens: workflow.max_narration_tokens,
            max_summary_tokens: workflow.max_summary_tokens,
            ..Default::default()
        },
    )
    .with_session(session.clone());

    let progress = progress_bar(ctx, snapshots.len())?;
    let bar = progress.clone();
    let subscription = session.subscribe(move |event, _| {
        if let SessionEvent::ProgressChanged { progress } = event {
            bar.set_position((progress * 100.0).round() as u64);
        }
    });

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = synthesizer.synthesize_with_cancel(&snapshots, &cancel).await;
    interrupt.abort();
    session.unsubscribe(subscription);
    progress.finish_and_clear();

    match result {
        Synthesis::Document(document) => {
            let sink = FolderSink::new(workflow.output_dir_in(&root));
            let path = sink
                .save(&document)
                .with_context(|| format!("Failed to save workflow to {}", sink.folder().display()))?;
            report(ctx, "saved", Some(path.as_path()), &format!("Saved workflow to {}", path.display()));
            Ok(())
        }
        Synthesis::Empty => {
            report(ctx, "empty", None, "Nothing to narrate.");
            Ok(())
        }
        Synthesis::Cancelled => {
            report(ctx, "cancelled", None, "Cancelled, no workflow written.");
            Ok(())
        }
        Synthesis::Failed(reason) => bail!("Workflow synthesis failed: {}", reason),
    }
}

/// Read a JSON-lines event log.
fn read_event_log(path: &Path) -> Result<Vec<EditorEvent>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event log {}", path.display()))?;

    let mut events = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let event = EditorEvent::parse_line(line)
            .with_context(|| format!("{}:{}: malformed event", path.display(), index + 1))?;
        events.extend(event);
    }
    Ok(events)
}

fn progress_bar(ctx: &Context, steps: usize) -> Result<ProgressBar> {
    if ctx.json_output {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(100);
    bar.set_style(ProgressStyle::with_template(
        "{spinner} Narrating {msg} [{bar:30}] {pos}%",
    )?);
    bar.set_message(format!("{} steps", steps));
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(bar)
}

fn print_snapshots(snapshots: &[Snapshot], ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(snapshots)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        println!("No snapshots recorded.");
        return Ok(());
    }

    let bold = Style::new().bold();
    let dim = Style::new().dim();
    for (index, snapshot) in snapshots.iter().enumerate() {
        println!("{} {}", bold.apply_to(format!("{:>3}.", index + 1)), snapshot.headline());
        if ctx.verbose
            && let Snapshot::FileDiff { diff, .. } = snapshot
        {
            for line in diff.lines() {
                println!("     {}", dim.apply_to(line));
            }
        }
    }
    Ok(())
}

fn report(ctx: &Context, status: &str, path: Option<&Path>, message: &str) {
    if ctx.json_output {
        let value = serde_json::json!({
            "status": status,
            "path": path.map(|p| p.display().to_string()),
        });
        println!("{}", value);
    } else {
        println!("{}", message);
    }
}
