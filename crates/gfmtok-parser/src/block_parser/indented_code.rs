//! Indented code block parsing.
//!
//! Blank lines inside an indented code block are held back until the next
//! code line arrives: trailing blank lines belong after the block, not in it.

use super::leaf_dispatch::LineContext;
use crate::error::Result;
use crate::parser_state::ParserState;
use crate::tabs::TAB_STOP;
use crate::tokens::{MarkdownToken, StackToken, TokenKind};

/// Columns of indentation that make a line an indented code line.
pub(crate) const CODE_INDENT: usize = TAB_STOP;

pub(crate) fn is_indented_code_line(ctx: &LineContext<'_>) -> bool {
    !ctx.is_blank() && ctx.indent() >= CODE_INDENT
}

pub(crate) fn start_indented_code_block(state: &mut ParserState, ctx: &LineContext<'_>) {
    let content_start = ctx.position.advance_columns(CODE_INDENT);
    let column = content_start.index_indent + 1;
    log::debug!("line {}: open indented code block", ctx.line_number());
    let token = state.push_token(MarkdownToken::new(
        TokenKind::IndentedCodeBlock {
            extracted_whitespace: content_start.consumed_since(&ctx.position).literal.to_string(),
        },
        ctx.line_number(),
        column,
    ));
    state.push_token(MarkdownToken::new(
        TokenKind::Text {
            text: content_start.rest_with_partial_tab(),
            extracted_whitespace: String::new(),
            end_whitespace: String::new(),
        },
        ctx.line_number(),
        column,
    ));
    state.stack.push(StackToken::IndentedCodeBlock {
        token,
        held_blank_lines: Vec::new(),
    });
}

/// Handle a code line or a blank line inside an open indented code block.
pub(crate) fn continue_indented_code_block(
    state: &mut ParserState,
    ctx: &LineContext<'_>,
) -> Result<()> {
    let line_number = ctx.line_number();
    let StackToken::IndentedCodeBlock {
        held_blank_lines, ..
    } = state.top_mut()
    else {
        return Err(state.invariant(line_number, "expected an open indented code block"));
    };

    if ctx.is_blank() {
        log::trace!("line {line_number}: hold blank line in indented code");
        held_blank_lines.push(MarkdownToken::new(
            TokenKind::BlankLine {
                extracted_whitespace: ctx.rest().to_string(),
            },
            line_number,
            ctx.position.index_indent + 1,
        ));
        return Ok(());
    }

    let held = std::mem::take(held_blank_lines);
    state.document.extend(held);

    let content_start = ctx.position.advance_columns(CODE_INDENT);
    state.push_token(MarkdownToken::new(
        TokenKind::Text {
            text: content_start.rest_with_partial_tab(),
            extracted_whitespace: content_start.consumed_since(&ctx.position).literal.to_string(),
            end_whitespace: String::new(),
        },
        line_number,
        content_start.index_indent + 1,
    ));
    Ok(())
}
