//! Block quote markers.

use crate::error::Result;
use crate::parser_state::ParserState;
use crate::position::PositionMarker;
use crate::tokens::{LeadingSpaces, MarkdownToken, StackToken, TokenKind};

/// Match a block quote marker at `pos`: up to three columns of indentation,
/// `>`, then one optional column of space.
///
/// Returns the position after the marker. A tab after `>` is split: one
/// column belongs to the marker and the rest is left for the content.
pub(crate) fn try_parse_blockquote_marker<'a>(
    pos: &PositionMarker<'a>,
) -> Option<PositionMarker<'a>> {
    if pos.indent() > 3 || pos.char_at_first_nonspace() != Some('>') {
        return None;
    }
    let (index, _) = pos.first_nonspace();
    let after = pos.advance_to(index + 1);
    match after.rest().chars().next() {
        Some(' ' | '\t') => Some(after.advance_columns(1)),
        _ => Some(after),
    }
}

/// Open a new block quote whose marker spans `start..end`.
pub(crate) fn open_block_quote(
    state: &mut ParserState,
    start: &PositionMarker<'_>,
    end: &PositionMarker<'_>,
) -> Result<()> {
    let line_number = start.line_number;
    let (marker_index, marker_column) = start.first_nonspace();
    let extracted_whitespace = &start.text_to_parse[start.index_number..marker_index];
    log::debug!("line {line_number}: open block quote at column {}", marker_column + 1);

    let token = state.push_token(MarkdownToken::new(
        TokenKind::BlockQuote {
            extracted_whitespace: extracted_whitespace.to_string(),
            leading_spaces: LeadingSpaces::default(),
        },
        line_number,
        marker_column + 1,
    ));
    state.stack.push(StackToken::BlockQuote { token });
    let consumed = end.consumed_since(start);
    state.record_leading_spaces(token, consumed.detabified, consumed.literal, line_number)
}
