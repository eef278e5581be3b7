//! Text clipping helpers.

/// Keep at most the first `max_lines` lines of `text`.
///
/// No ellipsis is added. Text that already fits is returned unchanged,
/// including any trailing newline.
pub fn clip_max_lines(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() <= max_lines {
        return text.to_string();
    }
    lines[..max_lines].join("\n")
}
