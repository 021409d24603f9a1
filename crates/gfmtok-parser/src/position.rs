//! Cursor within the line currently being processed.

use crate::tabs::{detabified_width, detabify, split_tab_at_boundary};

/// Immutable cursor into one physical line.
///
/// `index_number` is a byte offset into `text_to_parse` and `index_indent` is
/// the detabified column at that offset. The two disagree only when a
/// container boundary fell inside a tab: the index then still points at the
/// tab while the column is somewhere within its expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionMarker<'a> {
    pub line_number: usize,
    pub index_number: usize,
    pub text_to_parse: &'a str,
    pub index_indent: usize,
}

/// Text between two positions, in both literal and detabified form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedText<'a> {
    pub literal: &'a str,
    pub detabified: String,
}

impl<'a> PositionMarker<'a> {
    pub fn new(line_number: usize, text_to_parse: &'a str) -> Self {
        Self {
            line_number,
            index_number: 0,
            text_to_parse,
            index_indent: 0,
        }
    }

    /// Remaining text, starting at the cursor.
    pub fn rest(&self) -> &'a str {
        &self.text_to_parse[self.index_number..]
    }

    /// Byte offset and column of the first character that is not a space or tab.
    pub fn first_nonspace(&self) -> (usize, usize) {
        let mut index = self.index_number;
        let mut column = self.index_indent;
        for ch in self.rest().chars() {
            match ch {
                ' ' => column += 1,
                '\t' => column = detabified_width("\t", column),
                _ => break,
            }
            index += 1;
        }
        (index, column)
    }

    /// Columns of whitespace between the cursor and the first non-space.
    pub fn indent(&self) -> usize {
        self.first_nonspace().1 - self.index_indent
    }

    pub fn char_at_first_nonspace(&self) -> Option<char> {
        let (index, _) = self.first_nonspace();
        self.text_to_parse[index..].chars().next()
    }

    pub fn is_blank(&self) -> bool {
        let (index, _) = self.first_nonspace();
        index == self.text_to_parse.len()
    }

    /// Advance over `columns` columns of whitespace or marker characters.
    ///
    /// A tab straddling the new position stays under the cursor so that the
    /// next consumer sees its remaining columns.
    pub fn advance_columns(&self, columns: usize) -> Self {
        let boundary = split_tab_at_boundary(self.rest(), self.index_indent, columns);
        if let Some(split) = boundary.split {
            log::trace!(
                "line {}: tab at byte {} split {}+{}",
                self.line_number,
                self.index_number + split.tab_index,
                split.used_columns,
                split.leftover_columns
            );
        }
        Self {
            index_number: self.index_number + boundary.literal_len,
            index_indent: self.index_indent + boundary.columns,
            ..*self
        }
    }

    /// Advance to a byte offset at or after the cursor.
    pub fn advance_to(&self, index_number: usize) -> Self {
        let skipped = &self.text_to_parse[self.index_number..index_number];
        Self {
            index_number,
            index_indent: detabified_width(skipped, self.index_indent),
            ..*self
        }
    }

    /// Advance past the leading whitespace.
    pub fn skip_whitespace(&self) -> Self {
        let (index, _) = self.first_nonspace();
        self.advance_to(index)
    }

    /// What was consumed between `earlier` and this position.
    pub fn consumed_since(&self, earlier: &Self) -> ConsumedText<'a> {
        let literal = &self.text_to_parse[earlier.index_number..self.index_number];
        let mut detabified = detabify(literal, earlier.index_indent);
        let reached = detabified_width(literal, earlier.index_indent);
        if self.index_indent > reached {
            detabified.extend(std::iter::repeat_n(' ', self.index_indent - reached));
        }
        ConsumedText {
            literal,
            detabified,
        }
    }

    /// True when the cursor sits inside the expansion of a tab.
    pub fn has_partial_tab(&self) -> bool {
        self.rest().starts_with('\t')
            && detabified_width(&self.text_to_parse[..self.index_number], 0) != self.index_indent
    }

    /// The remaining text with any partially consumed tab replaced by the
    /// spaces that are still owed to the reader.
    pub fn rest_with_partial_tab(&self) -> String {
        let rest = self.rest();
        if self.has_partial_tab()
            && let Some(stripped) = rest.strip_prefix('\t')
        {
            let end = detabified_width("\t", self.index_indent);
            let mut out: String = std::iter::repeat_n(' ', end - self.index_indent).collect();
            out.push_str(stripped);
            out
        } else {
            rest.to_string()
        }
    }
}
