//! Config command - configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};
use worktrail_config::{LoadedConfig, resolve_api_key};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,

    /// Show which config files are loaded and their precedence
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    let loaded = worktrail_config::load_config(None)?;
    match args.command {
        ConfigCommand::Show => cmd_show(&loaded, ctx),
        ConfigCommand::Path => cmd_path(&loaded, ctx),
    }
}

fn cmd_show(loaded: &LoadedConfig, ctx: &Context) -> Result<()> {
    let config = &loaded.config;

    if ctx.json_output {
        let value = serde_json::json!({
            "config": config,
            "sources": loaded.loaded_from(),
            "warnings": loaded.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("# worktrail Configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    let llm = config.llm_or_default();
    let backend = llm.effective_backend();
    let model = llm.effective_model().unwrap_or_else(|| "(not set)".to_string());
    let key_status = if !backend.requires_api_key() {
        "no key needed".to_string()
    } else {
        match resolve_api_key(&backend, llm.api_key.as_deref()) {
            Some(secret) => format!("key from {}", secret.source),
            None => format!("no key (set {})", backend.env_var()),
        }
    };
    println!("Narration:");
    println!("  {} / {}  [{}]", backend, model, key_status);
    if let Some(ref url) = llm.base_url {
        println!("  base_url: {}", url);
    }
    println!();

    let workflow = config.workflow_or_default();
    println!("Workflow:");
    println!("  output_dir: {}", workflow.output_dir.display());
    println!("  max_narration_tokens: {}", workflow.max_narration_tokens);
    println!("  max_summary_tokens: {}", workflow.max_summary_tokens);
    println!();

    let recording = config.recording_or_default();
    println!("Recording:");
    if recording.ignore.is_empty() {
        println!("  ignore: (none)");
    } else {
        println!("  ignore: {}", recording.ignore.join(", "));
    }
    println!();

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        for w in &loaded.warnings {
            println!("  ⚠ {}", w);
        }
        println!();
    }

    if ctx.verbose {
        println!("---\nRaw config:\n");
        println!("{}", config.to_toml()?);
    }

    Ok(())
}

fn cmd_path(loaded: &LoadedConfig, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        let sources: Vec<_> = loaded
            .sources
            .iter()
            .map(|s| serde_json::json!({ "path": s.path.display().to_string(), "loaded": s.loaded }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&sources)?);
        return Ok(());
    }

    println!("Config file search order (later overrides earlier):\n");
    for source in &loaded.sources {
        let status = if source.loaded {
            "✓ loaded"
        } else {
            "· not found"
        };
        println!("  {} {}", status, source.path.display());
    }

    println!();
    let loaded_count = loaded.loaded_from().len();
    if loaded_count == 0 {
        println!("No config files found, using defaults.");
    } else {
        println!("{} config file(s) loaded.", loaded_count);
    }

    Ok(())
}
