//! Recovery of a document's text from before a change.
//!
//! The tracker only ever sees a document after a change landed. To open an
//! accumulation it needs the content from just before, which it recovers
//! by replaying the change's edits on a running buffer in the order given.

use worktrail_types::TextEdit;

/// Return the text as it was before `edits` produced `current`.
///
/// Each edit replaces `offset..offset + length_removed` of the running
/// buffer with `inserted_text`; later edits see the result of earlier ones.
/// Positions count characters. Out-of-range positions clamp to the end of
/// the buffer rather than panic.
pub fn content_before_change(current: &str, edits: &[TextEdit]) -> String {
    let mut text = current.to_string();
    for edit in edits {
        let start = byte_index(&text, edit.offset);
        let end = byte_index(&text, edit.offset.saturating_add(edit.length_removed));
        text.replace_range(start..end, &edit.inserted_text);
    }
    text
}

/// Byte index of the `chars`-th character, clamped to the string length.
fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_edit_list_returns_current() {
        assert_eq!(content_before_change("Hello World", &[]), "Hello World");
    }

    #[test]
    fn test_single_replacement() {
        let edits = [TextEdit::new(6, 5, "Universe")];
        assert_eq!(content_before_change("Hello World", &edits), "Hello Universe");
    }

    #[test]
    fn test_edits_apply_in_order() {
        let edits = [TextEdit::new(6, 5, "Universe"), TextEdit::new(0, 5, "Hi")];
        assert_eq!(content_before_change("Hello World", &edits), "Hi Universe");
    }

    #[test]
    fn test_insertion_and_deletion() {
        assert_eq!(content_before_change("ab", &[TextEdit::delete(1, 1)]), "a");
        assert_eq!(content_before_change("y", &[TextEdit::delete(0, 1)]), "");
        assert_eq!(content_before_change("", &[TextEdit::insert(0, "seed")]), "seed");
    }

    #[test]
    fn test_multibyte_offsets_count_characters() {
        let edits = [TextEdit::new(1, 1, "e")];
        assert_eq!(content_before_change("cäfe", &edits), "cefe");

        let edits = [TextEdit::insert(2, "🦀")];
        assert_eq!(content_before_change("añb", &edits), "añ🦀b");
    }

    #[test]
    fn test_out_of_range_edits_clamp() {
        assert_eq!(content_before_change("abc", &[TextEdit::new(10, 3, "!")]), "abc!");
        assert_eq!(content_before_change("abc", &[TextEdit::new(1, 99, "")]), "a");
        assert_eq!(
            content_before_change("abc", &[TextEdit::new(usize::MAX, usize::MAX, "x")]),
            "abcx"
        );
    }
}
