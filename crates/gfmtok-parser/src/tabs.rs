//! Tab expansion helpers.
//!
//! GFM resolves every tab to the next multiple-of-4 column. Containers
//! consume whole columns, so a single tab can be shared between a container
//! boundary and the content after it. Everything that needs to map between
//! literal source text and its detabified form goes through this module.

use crate::error::{Result, TokenizerError};

pub const TAB_STOP: usize = 4;

/// Columns a tab occupies when it starts at `column`.
pub fn tab_width_at(column: usize) -> usize {
    TAB_STOP - column % TAB_STOP
}

/// Expand every tab in `text`, which begins at `start_column`, into spaces.
pub fn detabify(text: &str, start_column: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = start_column;
    for ch in text.chars() {
        if ch == '\t' {
            let width = tab_width_at(column);
            out.extend(std::iter::repeat_n(' ', width));
            column += width;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    out
}

/// Column reached after `text` when it begins at `start_column`.
pub fn detabified_width(text: &str, start_column: usize) -> usize {
    text.chars().fold(start_column, |column, ch| {
        if ch == '\t' {
            column + tab_width_at(column)
        } else {
            column + 1
        }
    })
}

/// Find the shortest prefix of `original` whose detabified form is `target`.
///
/// When the caller does not know the column `original` starts at, every
/// offset within one tab stop is tried in turn.
pub fn find_literal_prefix<'a>(
    original: &'a str,
    target: &str,
    start_column: Option<usize>,
) -> Result<&'a str> {
    let offsets: Vec<usize> = match start_column {
        Some(column) => vec![column],
        None => (0..TAB_STOP).collect(),
    };

    for offset in offsets {
        if let Some(end) = literal_prefix_at(original, target, offset) {
            log::trace!("literal prefix of {original:?} for {target:?} at offset {offset}: {end}");
            return Ok(&original[..end]);
        }
    }

    Err(TokenizerError::DetabifiedPrefixNotFound {
        target: target.to_string(),
        original: original.to_string(),
    })
}

fn literal_prefix_at(original: &str, target: &str, start_column: usize) -> Option<usize> {
    let mut built = 0usize;
    let mut column = start_column;
    let target_bytes = target.as_bytes();

    if target.is_empty() {
        return Some(0);
    }

    for (index, ch) in original.char_indices() {
        if ch == '\t' {
            let width = tab_width_at(column);
            if built + width > target_bytes.len()
                || !target_bytes[built..built + width].iter().all(|b| *b == b' ')
            {
                return None;
            }
            built += width;
            column += width;
        } else {
            let len = ch.len_utf8();
            if !target[built..].starts_with(ch) {
                return None;
            }
            built += len;
            column += 1;
        }

        if built == target_bytes.len() {
            return Some(index + ch.len_utf8());
        }
    }

    None
}

/// A tab whose expansion straddles a column boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitTab {
    /// Byte index of the tab within the scanned text.
    pub tab_index: usize,
    /// Columns of the tab that fall before the boundary.
    pub used_columns: usize,
    /// Columns of the tab left over for the next consumer.
    pub leftover_columns: usize,
}

/// Result of walking a number of columns into some text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabBoundary {
    /// Bytes that were consumed completely. A split tab is not included.
    pub literal_len: usize,
    /// Columns actually walked; less than requested if the text ran out.
    pub columns: usize,
    pub split: Option<SplitTab>,
}

/// Walk `columns` columns into `text`, which begins at `start_column`.
///
/// If the boundary lands inside a tab, the literal prefix stops before that
/// tab and the split is reported so the caller can hand the remaining
/// columns to whatever consumes the text next.
pub fn split_tab_at_boundary(text: &str, start_column: usize, columns: usize) -> TabBoundary {
    let mut walked = 0usize;
    let mut column = start_column;

    for (index, ch) in text.char_indices() {
        if walked == columns {
            return TabBoundary {
                literal_len: index,
                columns: walked,
                split: None,
            };
        }

        if ch == '\t' {
            let width = tab_width_at(column);
            let remaining = columns - walked;
            if width > remaining {
                return TabBoundary {
                    literal_len: index,
                    columns,
                    split: Some(SplitTab {
                        tab_index: index,
                        used_columns: remaining,
                        leftover_columns: width - remaining,
                    }),
                };
            }
            walked += width;
            column += width;
        } else {
            walked += 1;
            column += 1;
        }
    }

    TabBoundary {
        literal_len: text.len(),
        columns: walked,
        split: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn detabify_expands_to_next_stop() {
        assert_eq!(detabify("\ta", 0), "    a");
        assert_eq!(detabify(" \ta", 0), "    a");
        assert_eq!(detabify("\ta", 1), "   a");
        assert_eq!(detabify("ab\tc\td", 0), "ab  c   d");
    }

    #[test]
    fn width_matches_detabified_length() {
        assert_eq!(detabified_width(">\t", 0), 4);
        assert_eq!(detabified_width("\t\t", 2), 8);
    }

    #[test]
    fn literal_prefix_for_leading_tab() {
        assert_eq!(find_literal_prefix("\tfoo", "    ", Some(0)), Ok("\t"));
        assert_eq!(find_literal_prefix("\tfoo", "    f", Some(0)), Ok("\tf"));
    }

    #[test]
    fn literal_prefix_tries_every_offset() {
        // Three columns of expansion means the tab started at column 1.
        assert_eq!(find_literal_prefix("\tfoo", "   f", None), Ok("\tf"));
    }

    #[test]
    fn literal_prefix_missing_is_an_error() {
        let err = find_literal_prefix("\tfoo", "  x", Some(0)).unwrap_err();
        assert!(matches!(
            err,
            TokenizerError::DetabifiedPrefixNotFound { .. }
        ));
    }

    #[test]
    fn literal_prefix_empty_target() {
        assert_eq!(find_literal_prefix("abc", "", Some(3)), Ok(""));
    }

    #[test]
    fn split_tab_after_block_quote_marker() {
        // `>` at column 0, the tab spans columns 1..4; a one-column space
        // after the marker uses one of those columns.
        let boundary = split_tab_at_boundary("\tfoo", 1, 1);
        assert_eq!(boundary.literal_len, 0);
        assert_eq!(boundary.columns, 1);
        assert_eq!(
            boundary.split,
            Some(SplitTab {
                tab_index: 0,
                used_columns: 1,
                leftover_columns: 2,
            })
        );
    }

    #[test]
    fn split_tab_exact_fit_is_not_split() {
        let boundary = split_tab_at_boundary(" \tfoo", 0, 4);
        assert_eq!(boundary.literal_len, 2);
        assert_eq!(boundary.columns, 4);
        assert_eq!(boundary.split, None);
    }

    #[test]
    fn split_tab_runs_out_of_text() {
        let boundary = split_tab_at_boundary("  ", 0, 4);
        assert_eq!(boundary.literal_len, 2);
        assert_eq!(boundary.columns, 2);
        assert_eq!(boundary.split, None);
    }

    proptest! {
        #[test]
        fn detabify_is_idempotent(s in "[ \tab>-]{0,24}", offset in 0usize..4) {
            let once = detabify(&s, offset);
            prop_assert_eq!(detabify(&once, offset), once.clone());
        }

        #[test]
        fn literal_prefix_round_trips(s in "[ \tab>*]{0,24}", offset in 0usize..4) {
            let target = detabify(&s, offset);
            let prefix = find_literal_prefix(&s, &target, Some(offset)).unwrap();
            prop_assert_eq!(detabify(prefix, offset), target);
        }

        #[test]
        fn boundary_walk_accounts_for_every_column(
            s in "[ \tx]{0,16}",
            offset in 0usize..4,
            columns in 0usize..12,
        ) {
            let boundary = split_tab_at_boundary(&s, offset, columns);
            let consumed = detabified_width(&s[..boundary.literal_len], offset) - offset;
            let partial = boundary.split.map_or(0, |split| split.used_columns);
            prop_assert_eq!(consumed + partial, boundary.columns);
            prop_assert!(boundary.columns <= columns);
        }
    }
}
