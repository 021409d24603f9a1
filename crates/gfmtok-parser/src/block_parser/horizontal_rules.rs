//! Thematic break parsing.

use super::leaf_dispatch::LineContext;
use crate::parser_state::ParserState;
use crate::tokens::{MarkdownToken, TokenKind};

/// Try to parse a thematic break from content starting at its first
/// non-space character.
///
/// A thematic break is 3 or more `*`, `-`, or `_` characters, optionally
/// separated by spaces or tabs, and nothing else.
pub(crate) fn try_parse_thematic_break(content: &str) -> Option<char> {
    let rule_char = content.chars().next()?;
    if !matches!(rule_char, '*' | '-' | '_') {
        return None;
    }

    let mut count = 0;
    for ch in content.chars() {
        match ch {
            c if c == rule_char => count += 1,
            ' ' | '\t' => continue,
            _ => return None,
        }
    }

    if count >= 3 { Some(rule_char) } else { None }
}

pub(crate) fn emit_thematic_break(state: &mut ParserState, ctx: &LineContext<'_>, rule_char: char) {
    log::debug!("line {}: thematic break '{rule_char}'", ctx.line_number());
    state.push_token(MarkdownToken::new(
        TokenKind::ThematicBreak {
            start_character: rule_char,
            extracted_whitespace: ctx.leading_whitespace().to_string(),
            rest_of_line: ctx.content().to_string(),
        },
        ctx.line_number(),
        ctx.content_column(),
    ));
}
