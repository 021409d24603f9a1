//! Fenced code block parsing.

use super::leaf_dispatch::LineContext;
use super::utils::{count_run, is_space_or_tab, split_leading_whitespace, split_trailing_whitespace};
use crate::error::Result;
use crate::parser_state::ParserState;
use crate::tokens::{MarkdownToken, StackToken, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FenceInfo<'a> {
    pub fence_char: char,
    pub fence_count: usize,
    pub whitespace_before_info: &'a str,
    pub info_string: &'a str,
}

/// Try to detect an opening fence in content starting at its first
/// non-space character.
pub(crate) fn try_parse_fence_open(content: &str) -> Option<FenceInfo<'_>> {
    let fence_char = content.chars().next()?;
    if fence_char != '`' && fence_char != '~' {
        return None;
    }
    let fence_count = count_run(content, fence_char);
    if fence_count < 3 {
        return None;
    }

    let (whitespace_before_info, rest) = split_leading_whitespace(&content[fence_count..]);
    let (info_string, _) = split_trailing_whitespace(rest);

    // Backtick fences cannot carry backticks in their info string, otherwise
    // an inline code span would be mistaken for a fence.
    if fence_char == '`' && info_string.contains('`') {
        return None;
    }

    Some(FenceInfo {
        fence_char,
        fence_count,
        whitespace_before_info,
        info_string,
    })
}

/// Check if content closes a fence opened with `fence_count` `fence_char`s.
pub(crate) fn is_closing_fence(content: &str, fence_char: char, fence_count: usize) -> bool {
    let closing_count = count_run(content, fence_char);
    closing_count >= fence_count && content[closing_count..].chars().all(is_space_or_tab)
}

pub(crate) fn start_fenced_code_block(
    state: &mut ParserState,
    ctx: &LineContext<'_>,
    fence: &FenceInfo<'_>,
) {
    log::debug!(
        "line {}: open fence {}x'{}' info={:?}",
        ctx.line_number(),
        fence.fence_count,
        fence.fence_char,
        fence.info_string
    );
    let token = state.push_token(MarkdownToken::new(
        TokenKind::FencedCodeBlock {
            fence_character: fence.fence_char,
            fence_count: fence.fence_count,
            info_string: fence.info_string.to_string(),
            whitespace_before_info: fence.whitespace_before_info.to_string(),
            extracted_whitespace: ctx.leading_whitespace().to_string(),
        },
        ctx.line_number(),
        ctx.content_column(),
    ));
    state.stack.push(StackToken::FencedCodeBlock {
        token,
        fence_character: fence.fence_char,
        fence_count: fence.fence_count,
        indent_budget: ctx.indent(),
    });
}

/// Handle a line while a fenced code block is the innermost open construct.
pub(crate) fn continue_fenced_code_block(
    state: &mut ParserState,
    ctx: &LineContext<'_>,
) -> Result<()> {
    let StackToken::FencedCodeBlock {
        fence_character,
        fence_count,
        indent_budget,
        ..
    } = *state.top()
    else {
        return Err(state.invariant(ctx.line_number(), "expected an open fenced code block"));
    };

    if ctx.indent() <= 3 && is_closing_fence(ctx.content(), fence_character, fence_count) {
        log::debug!("line {}: close fence", ctx.line_number());
        return state.close_top(
            false,
            ctx.leading_whitespace().to_string(),
            Some(ctx.content().to_string()),
        );
    }

    if ctx.is_blank() {
        state.push_token(MarkdownToken::new(
            TokenKind::BlankLine {
                extracted_whitespace: ctx.rest().to_string(),
            },
            ctx.line_number(),
            ctx.position.index_indent + 1,
        ));
        return Ok(());
    }

    // Remove at most as much indentation as the opening fence had.
    let removed = ctx.indent().min(indent_budget);
    let content_start = ctx.position.advance_columns(removed);
    state.push_token(MarkdownToken::new(
        TokenKind::Text {
            text: content_start.rest_with_partial_tab(),
            extracted_whitespace: content_start.consumed_since(&ctx.position).literal.to_string(),
            end_whitespace: String::new(),
        },
        ctx.line_number(),
        content_start.index_indent + 1,
    ));
    Ok(())
}
