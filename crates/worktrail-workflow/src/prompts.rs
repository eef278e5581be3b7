//! Prompts and markdown rendering for workflow documents.

use worktrail_types::Snapshot;

/// System prompt for per-step narration.
pub const NARRATION_SYSTEM_PROMPT: &str = "\
You are documenting a developer's workflow so a teammate can repeat it later. \
You will be shown one step of a recorded session: a file diff, a file action, \
or a terminal command. Explain in 1-3 sentences why the developer most likely \
took this step and what it achieves. Refer to files and commands by name. \
Do not restate the diff line by line and do not use headings.";

/// System prompt for the overall summary.
pub const SUMMARY_SYSTEM_PROMPT: &str = "\
You are documenting a developer's workflow so a teammate can repeat it later. \
Given the narrated steps of a recorded session, write a short summary of what \
the session accomplished and when someone would want to follow it. Start with \
a single markdown level-one heading naming the task, then 1-2 paragraphs.";

/// System prompt for naming the document.
pub const NAMING_SYSTEM_PROMPT: &str = "\
Choose a short, descriptive file name (2-6 words) for a workflow document. \
Call the provided tool with the name.";

/// System prompt for choosing a saved workflow.
pub const FINDER_SYSTEM_PROMPT: &str = "\
You help a developer find a previously recorded workflow. Pick the workflow \
file that best helps with the task and call the provided tool with its path. \
If none of the files are relevant, do not call the tool.";

/// Render a snapshot's raw payload as markdown.
///
/// Diffs go in a `diff` fence, commands in an `sh` fence, file actions on a
/// plain line.
pub fn render_payload(snapshot: &Snapshot) -> String {
    match snapshot {
        Snapshot::FileDiff { diff, .. } => fenced("diff", diff),
        Snapshot::TerminalCommand { command, cwd } => {
            let block = fenced("sh", command);
            match cwd {
                Some(cwd) => format!("In `{}`:\n\n{}", cwd, block),
                None => block,
            }
        }
        Snapshot::FileAction { .. } => format!("`{}`", snapshot.headline()),
    }
}

fn fenced(lang: &str, body: &str) -> String {
    let body = body.trim_end_matches('\n');
    // Widen the fence if the payload itself contains one
    let fence = if body.contains("```") { "````" } else { "```" };
    format!("{fence}{lang}\n{body}\n{fence}")
}

/// User prompt asking why a single step happened.
///
/// `earlier` holds headlines of the preceding steps for context.
pub fn narration_prompt(index: usize, total: usize, snapshot: &Snapshot, earlier: &[String]) -> String {
    let mut prompt = String::new();
    if !earlier.is_empty() {
        prompt.push_str("Steps so far:\n");
        for (i, headline) in earlier.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, headline));
        }
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "Step {} of {} ({}):\n\n{}\n\nWhy did the developer do this?",
        index + 1,
        total,
        snapshot.kind(),
        render_payload(snapshot)
    ));
    prompt
}

/// User prompt asking for the overall summary.
pub fn summary_prompt(steps: &[(&Snapshot, &str)]) -> String {
    let mut prompt = String::from("Narrated steps of the session:\n\n");
    for (i, (snapshot, narration)) in steps.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. {}\n   {}\n",
            i + 1,
            snapshot.headline(),
            narration.trim()
        ));
    }
    prompt.push_str("\nWhat did this session accomplish?");
    prompt
}

/// Assemble the final document body.
pub fn render_document(summary: &str, steps: &[(&Snapshot, &str)]) -> String {
    let mut out = String::new();
    out.push_str(summary.trim());
    out.push_str("\n\n## Steps\n");
    for (i, (snapshot, narration)) in steps.iter().enumerate() {
        out.push_str(&format!(
            "\n### {}. {}\n\n{}\n\n{}\n",
            i + 1,
            snapshot.headline(),
            narration.trim(),
            render_payload(snapshot)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use worktrail_types::FileActionKind;

    #[test]
    fn test_render_diff_payload() {
        let rendered = render_payload(&Snapshot::file_diff("a.rs", "--- a.rs\n+++ a.rs\n+x\n"));
        assert_eq!(rendered, "```diff\n--- a.rs\n+++ a.rs\n+x\n```");
    }

    #[test]
    fn test_render_command_payload() {
        assert_eq!(
            render_payload(&Snapshot::terminal_command("cargo test", None)),
            "```sh\ncargo test\n```"
        );
        assert_eq!(
            render_payload(&Snapshot::terminal_command("ls", Some("/repo".into()))),
            "In `/repo`:\n\n```sh\nls\n```"
        );
    }

    #[test]
    fn test_render_file_action_payload() {
        assert_eq!(
            render_payload(&Snapshot::file_action(FileActionKind::Create, "new.rs")),
            "`create new.rs`"
        );
    }

    #[test]
    fn test_fence_widened_for_nested_fence() {
        let rendered = render_payload(&Snapshot::file_diff("README.md", "+```rust\n"));
        assert!(rendered.starts_with("````diff\n"));
        assert!(rendered.ends_with("\n````"));
    }

    #[test]
    fn test_narration_prompt_includes_context() {
        let snapshot = Snapshot::terminal_command("cargo build", None);
        let prompt = narration_prompt(1, 3, &snapshot, &["edit src/lib.rs".to_string()]);
        assert!(prompt.contains("Steps so far:\n1. edit src/lib.rs"));
        assert!(prompt.contains("Step 2 of 3 (command)"));
        assert!(prompt.contains("```sh\ncargo build\n```"));
    }

    #[test]
    fn test_render_document_order() {
        let a = Snapshot::file_diff("a.rs", "+a\n");
        let b = Snapshot::terminal_command("make", None);
        let doc = render_document("# Build\n\nSummary.", &[(&a, "Why a."), (&b, "Why make.")]);

        assert!(doc.starts_with("# Build\n\nSummary.\n\n## Steps\n"));
        let a_pos = doc.find("### 1. edit a.rs").unwrap();
        let b_pos = doc.find("### 2. $ make").unwrap();
        assert!(a_pos < b_pos);
        assert!(doc.contains("Why a.\n\n```diff\n+a\n```"));
    }
}
