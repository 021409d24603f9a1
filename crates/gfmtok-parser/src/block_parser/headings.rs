//! ATX and setext heading parsing.

use super::leaf_dispatch::LineContext;
use super::utils::{count_run, is_space_or_tab, split_leading_whitespace, split_trailing_whitespace};
use crate::error::Result;
use crate::parser_state::ParserState;
use crate::tabs::detabified_width;
use crate::tokens::{MarkdownToken, TokenKind};

/// The pieces of an ATX heading line, after the leading indentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AtxHeading<'a> {
    pub level: usize,
    /// Whitespace between the opening hashes and the text.
    pub whitespace_after_hashes: &'a str,
    pub text: &'a str,
    /// Whitespace between the text and the closing hashes.
    pub whitespace_before_closing: &'a str,
    pub closing_count: usize,
    pub trailing_whitespace: &'a str,
}

/// Try to parse an ATX heading from content starting at its first
/// non-space character.
pub(crate) fn try_parse_atx_heading(content: &str) -> Option<AtxHeading<'_>> {
    let level = count_run(content, '#');
    if level == 0 || level > 6 {
        return None;
    }

    // After hashes, must be end of line, space, or tab
    let after_hashes = &content[level..];
    if after_hashes.chars().next().is_some_and(|ch| !is_space_or_tab(ch)) {
        return None;
    }

    let (whitespace_after_hashes, rest) = split_leading_whitespace(after_hashes);
    let (body, trailing_whitespace) = split_trailing_whitespace(rest);

    // An optional closing sequence must be separated from the text by
    // whitespace, unless the heading text is empty.
    let closing_count = body.chars().rev().take_while(|&c| c == '#').count();
    let before_closing = &body[..body.len() - closing_count];
    let (text, whitespace_before_closing, closing_count) = if closing_count > 0
        && (before_closing.is_empty() || before_closing.ends_with(is_space_or_tab))
    {
        let (text, ws) = split_trailing_whitespace(before_closing);
        (text, ws, closing_count)
    } else {
        (body, "", 0)
    };

    Some(AtxHeading {
        level,
        whitespace_after_hashes,
        text,
        whitespace_before_closing,
        closing_count,
        trailing_whitespace,
    })
}

pub(crate) fn emit_atx_heading(
    state: &mut ParserState,
    ctx: &LineContext<'_>,
    heading: &AtxHeading<'_>,
) {
    log::debug!("line {}: ATX heading level {}", ctx.line_number(), heading.level);
    let line_number = ctx.line_number();
    let column = ctx.content_column();
    let start = state.push_token(MarkdownToken::new(
        TokenKind::AtxHeading {
            hash_count: heading.level,
            remove_trailing_count: heading.closing_count,
            extracted_whitespace: ctx.leading_whitespace().to_string(),
        },
        line_number,
        column,
    ));
    if !heading.text.is_empty() {
        let text_column =
            detabified_width(heading.whitespace_after_hashes, column - 1 + heading.level) + 1;
        state.push_token(MarkdownToken::new(
            TokenKind::Text {
                text: heading.text.to_string(),
                extracted_whitespace: heading.whitespace_after_hashes.to_string(),
                end_whitespace: String::new(),
            },
            line_number,
            text_column,
        ));
    }
    let extra = (!heading.trailing_whitespace.is_empty())
        .then(|| heading.trailing_whitespace.to_string());
    state.push_token(MarkdownToken::end(
        start,
        "atx",
        heading.whitespace_before_closing.to_string(),
        extra,
        false,
    ));
}

/// A setext underline: the character, its count and any trailing whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SetextUnderline<'a> {
    pub character: char,
    pub count: usize,
    pub trailing_whitespace: &'a str,
}

/// Try to parse a setext underline from content starting at its first
/// non-space character.
pub(crate) fn try_parse_setext_underline(content: &str) -> Option<SetextUnderline<'_>> {
    let character = content.chars().next()?;
    if character != '=' && character != '-' {
        return None;
    }
    let count = count_run(content, character);
    let rest = &content[count..];
    if !rest.chars().all(is_space_or_tab) {
        return None;
    }
    Some(SetextUnderline {
        character,
        count,
        trailing_whitespace: rest,
    })
}

/// Turn the open paragraph into a setext heading and close it.
pub(crate) fn emit_setext_heading(
    state: &mut ParserState,
    ctx: &LineContext<'_>,
    underline: SetextUnderline<'_>,
) -> Result<()> {
    let line_number = ctx.line_number();
    let Some(paragraph) = state.open_paragraph() else {
        return Err(state.invariant(line_number, "setext underline without an open paragraph"));
    };
    log::debug!(
        "line {line_number}: setext underline '{}' closes paragraph {}",
        underline.character,
        paragraph.0
    );
    if let Some(token) = state.token_mut(paragraph)
        && let TokenKind::Paragraph {
            extracted_whitespace,
            final_whitespace,
        } = &mut token.kind
    {
        let extracted_whitespace = std::mem::take(extracted_whitespace);
        let final_whitespace = std::mem::take(final_whitespace);
        token.kind = TokenKind::SetextHeading {
            heading_character: underline.character,
            heading_character_count: underline.count,
            extracted_whitespace,
            final_whitespace,
        };
    }
    let extra = (!underline.trailing_whitespace.is_empty())
        .then(|| underline.trailing_whitespace.to_string());
    state.close_top(false, ctx.leading_whitespace().to_string(), extra)
}
