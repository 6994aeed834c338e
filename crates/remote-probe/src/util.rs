//! Small helpers shared across the crate.

/// Decode raw channel output into the canonical text form: lossy UTF-8,
/// trailing whitespace trimmed from every line, lines joined by `\n`, and no
/// trailing newline.
///
/// Remote CLIs pad lines and always end output with a newline; canonicalizing
/// here means callers compare against plain expected strings.
#[must_use]
pub fn normalize_output(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let mut lines: Vec<&str> = text.split('\n').map(str::trim_end).collect();

    // A trailing newline produces one empty trailing element; drop it rather
    // than rendering it as a blank line.
    while lines.last() == Some(&"") {
        lines.pop();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trims_trailing_whitespace_per_line() {
        assert_eq!(normalize_output(b"hello   \nworld\t\n"), "hello\nworld");
    }

    #[test]
    fn empty_output_is_empty_string() {
        assert_eq!(normalize_output(b""), "");
        assert_eq!(normalize_output(b"\n"), "");
        assert_eq!(normalize_output(b"\n\n\n"), "");
    }

    #[test]
    fn preserves_interior_blank_lines() {
        assert_eq!(normalize_output(b"a\n\nb\n"), "a\n\nb");
    }

    #[test]
    fn preserves_leading_whitespace() {
        assert_eq!(normalize_output(b"  indented\n"), "  indented");
    }

    #[test]
    fn crlf_line_endings() {
        assert_eq!(normalize_output(b"one\r\ntwo\r\n"), "one\ntwo");
    }

    #[test]
    fn invalid_utf8_is_lossy() {
        let out = normalize_output(b"ok \xff\n");
        assert!(out.starts_with("ok"));
    }

    proptest! {
        #[test]
        fn never_ends_with_whitespace_line(input: Vec<u8>) {
            let out = normalize_output(&input);
            if let Some(last) = out.lines().last() {
                prop_assert_eq!(last, last.trim_end());
            }
            prop_assert!(!out.ends_with('\n'));
        }

        #[test]
        fn idempotent(input: Vec<u8>) {
            let once = normalize_output(&input);
            let twice = normalize_output(once.as_bytes());
            prop_assert_eq!(once, twice);
        }
    }
}
