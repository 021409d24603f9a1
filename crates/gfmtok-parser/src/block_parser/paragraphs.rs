//! Paragraph parsing.
//!
//! Every line of a paragraph becomes its own `Text` token here; the
//! coalesce pass joins them afterwards. The first line's indentation lives
//! on the paragraph token, later lines keep theirs on their `Text`.

use super::leaf_dispatch::LineContext;
use crate::parser_state::ParserState;
use crate::tokens::{MarkdownToken, StackToken, TokenKind};

pub(crate) fn start_paragraph(state: &mut ParserState, ctx: &LineContext<'_>) {
    log::debug!("line {}: open paragraph", ctx.line_number());
    let token = state.push_token(MarkdownToken::new(
        TokenKind::Paragraph {
            extracted_whitespace: ctx.leading_whitespace().to_string(),
            final_whitespace: String::new(),
        },
        ctx.line_number(),
        ctx.content_column(),
    ));
    state.push_token(MarkdownToken::new(
        TokenKind::Text {
            text: ctx.content().to_string(),
            extracted_whitespace: String::new(),
            end_whitespace: String::new(),
        },
        ctx.line_number(),
        ctx.content_column(),
    ));
    state.stack.push(StackToken::Paragraph { token });
}

/// Add a line to the open paragraph, lazy or not.
pub(crate) fn continue_paragraph(state: &mut ParserState, ctx: &LineContext<'_>) {
    state.push_token(MarkdownToken::new(
        TokenKind::Text {
            text: ctx.content().to_string(),
            extracted_whitespace: ctx.leading_whitespace().to_string(),
            end_whitespace: String::new(),
        },
        ctx.line_number(),
        ctx.content_column(),
    ));
}
