//! Unified diffs between two versions of a file.

use similar::TextDiff;

/// Lines of unchanged context around each hunk.
pub const CONTEXT_LINES: usize = 3;

/// Produce a unified diff patch from `before` to `after`.
///
/// Both headers carry `path`. A missing trailing newline is flagged with the
/// usual `\ No newline at end of file` marker. Identical inputs yield an
/// empty string; deciding whether that is worth recording is up to the
/// caller.
pub fn unified_diff(path: &str, before: &str, after: &str) -> String {
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .missing_newline_hint(true)
        .header(path, path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_and_changes() {
        let patch = unified_diff("src/x.txt", "a", "ab");
        assert!(patch.starts_with("--- src/x.txt\n+++ src/x.txt\n"));
        assert!(patch.contains("\n-a\n"));
        assert!(patch.contains("\n+ab\n"));
        assert!(patch.contains("No newline at end of file"));
    }

    #[test]
    fn test_creation_from_empty() {
        let patch = unified_diff("y.txt", "", "y\n");
        assert!(patch.contains("+y"));
        assert!(!patch.contains("\n-"));
    }

    #[test]
    fn test_identical_inputs_produce_no_hunks() {
        assert!(unified_diff("same.rs", "fn main() {}\n", "fn main() {}\n").is_empty());
    }

    #[test]
    fn test_context_is_limited() {
        let before: String = (1..=20).map(|i| format!("line {}\n", i)).collect();
        let after = before.replace("line 10\n", "line ten\n");

        let patch = unified_diff("lines.txt", &before, &after);
        assert!(patch.contains("-line 10"));
        assert!(patch.contains("+line ten"));
        assert!(patch.contains(" line 7\n"));
        assert!(!patch.contains(" line 6\n"));
        assert!(patch.contains(" line 13\n"));
        assert!(!patch.contains(" line 14\n"));
    }

    #[test]
    fn test_deterministic() {
        let a = unified_diff("f", "one\ntwo\n", "one\nthree\n");
        let b = unified_diff("f", "one\ntwo\n", "one\nthree\n");
        assert_eq!(a, b);
    }
}
