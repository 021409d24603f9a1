//! Shared utilities for block parsing.

/// Split input into physical lines on `\n`.
///
/// Empty input has no lines. Otherwise the text after the last newline is
/// the final line, so input ending in a newline ends with an empty line.
pub(crate) fn split_lines(input: &str) -> Vec<&str> {
    if input.is_empty() {
        return vec![];
    }
    input.split('\n').collect()
}

pub(crate) fn is_space_or_tab(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

/// Split a line into its leading spaces/tabs and the rest.
pub(crate) fn split_leading_whitespace(line: &str) -> (&str, &str) {
    let rest = line.trim_start_matches(is_space_or_tab);
    line.split_at(line.len() - rest.len())
}

/// Split a line into its content and trailing spaces/tabs.
pub(crate) fn split_trailing_whitespace(line: &str) -> (&str, &str) {
    let content = line.trim_end_matches(is_space_or_tab);
    line.split_at(content.len())
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.chars().all(is_space_or_tab)
}

/// Number of leading characters equal to `ch`.
pub(crate) fn count_run(text: &str, ch: char) -> usize {
    text.chars().take_while(|&c| c == ch).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_keeps_final_empty_line() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("a"), vec!["a"]);
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
    }

    #[test]
    fn whitespace_splits() {
        assert_eq!(split_leading_whitespace(" \t x "), (" \t ", "x "));
        assert_eq!(split_trailing_whitespace("x \t"), ("x", " \t"));
        assert_eq!(split_trailing_whitespace("   "), ("", "   "));
        assert!(is_blank(" \t"));
        assert!(!is_blank(" a"));
    }
}
