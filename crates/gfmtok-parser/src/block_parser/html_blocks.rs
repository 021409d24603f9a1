//! HTML block parsing.
//!
//! GFM has seven kinds of HTML block, told apart by how they start. The first
//! five end at a line containing a specific marker; the last two end at a
//! blank line.

use std::sync::LazyLock;

use regex::Regex;

use super::leaf_dispatch::LineContext;
use crate::error::Result;
use crate::parser_state::ParserState;
use crate::tokens::{MarkdownToken, StackToken, TokenKind};

/// Tag names that start a kind-6 HTML block.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "base",
    "basefont",
    "blockquote",
    "body",
    "caption",
    "center",
    "col",
    "colgroup",
    "dd",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "frame",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hr",
    "html",
    "iframe",
    "legend",
    "li",
    "link",
    "main",
    "menu",
    "menuitem",
    "nav",
    "noframes",
    "ol",
    "optgroup",
    "option",
    "p",
    "param",
    "section",
    "source",
    "summary",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "title",
    "tr",
    "track",
    "ul",
];

/// Tags whose content is raw text; a blank line does not end them.
const RAW_TAGS: &[&str] = &["script", "pre", "style", "textarea"];

static COMPLETE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
        ^(?:
            <[A-Za-z][A-Za-z0-9-]*
                (?:[\ \t]+[A-Za-z_:][A-Za-z0-9_.:-]*
                    (?:[\ \t]*=[\ \t]*(?:[^"'=<>`\x00-\x20]+|'[^']*'|"[^"]*"))?
                )*
                [\ \t]*/?>
            |
            </[A-Za-z][A-Za-z0-9-]*[\ \t]*>
        )
        [\ \t]*$"#,
    )
    .expect("complete tag pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum HtmlBlockKind {
    /// `<script`, `<pre`, `<style` or `<textarea`
    Raw,
    /// `<!-- ... -->`
    Comment,
    /// `<? ... ?>`
    ProcessingInstruction,
    /// `<!DOCTYPE ...>` and friends
    Declaration,
    /// `<![CDATA[ ... ]]>`
    CData,
    /// Opening or closing tag of a known block-level element
    BlockTag,
    /// Any other complete tag alone on its line
    CompleteTag,
}

impl HtmlBlockKind {
    /// Blocks of this kind end at a blank line instead of an end marker.
    pub fn ends_at_blank_line(self) -> bool {
        matches!(self, HtmlBlockKind::BlockTag | HtmlBlockKind::CompleteTag)
    }

    /// True if `line` contains this kind's end marker.
    pub(crate) fn is_end_line(self, line: &str) -> bool {
        match self {
            HtmlBlockKind::Raw => {
                let lower = line.to_ascii_lowercase();
                RAW_TAGS
                    .iter()
                    .any(|tag| lower.contains(&format!("</{tag}>")))
            }
            HtmlBlockKind::Comment => line.contains("-->"),
            HtmlBlockKind::ProcessingInstruction => line.contains("?>"),
            HtmlBlockKind::Declaration => line.contains('>'),
            HtmlBlockKind::CData => line.contains("]]>"),
            HtmlBlockKind::BlockTag | HtmlBlockKind::CompleteTag => false,
        }
    }
}

/// Length of a tag name at the start of `text`, which follows `<` or `</`.
fn tag_name_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, ch)) if ch.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    chars
        .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '-'))
        .map_or(text.len(), |(index, _)| index)
}

/// Try to detect the start of an HTML block in content starting at its
/// first non-space character.
///
/// The seventh kind cannot interrupt a paragraph.
pub(crate) fn try_parse_html_block_start(
    content: &str,
    in_paragraph: bool,
) -> Option<HtmlBlockKind> {
    let after_lt = content.strip_prefix('<')?;

    if after_lt.starts_with("!--") {
        return Some(HtmlBlockKind::Comment);
    }
    if after_lt.starts_with('?') {
        return Some(HtmlBlockKind::ProcessingInstruction);
    }
    if after_lt.starts_with("![CDATA[") {
        return Some(HtmlBlockKind::CData);
    }
    if let Some(rest) = after_lt.strip_prefix('!')
        && rest.starts_with(|ch: char| ch.is_ascii_alphabetic())
    {
        return Some(HtmlBlockKind::Declaration);
    }

    let (is_closing, name_start) = match after_lt.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, after_lt),
    };
    let name_len = tag_name_len(name_start);
    if name_len > 0 {
        let name = name_start[..name_len].to_ascii_lowercase();
        let after_name = &name_start[name_len..];

        if !is_closing
            && RAW_TAGS.contains(&name.as_str())
            && (after_name.is_empty()
                || after_name.starts_with([' ', '\t', '>']))
        {
            return Some(HtmlBlockKind::Raw);
        }

        if BLOCK_TAGS.contains(&name.as_str())
            && (after_name.is_empty()
                || after_name.starts_with([' ', '\t', '>'])
                || after_name.starts_with("/>"))
        {
            return Some(HtmlBlockKind::BlockTag);
        }

        // Only the opening raw-text tags belong to the first kind.
        let opens_raw_text = !is_closing && RAW_TAGS.contains(&name.as_str());
        if !in_paragraph && !opens_raw_text && COMPLETE_TAG.is_match(content) {
            return Some(HtmlBlockKind::CompleteTag);
        }
    }

    None
}

fn push_html_text(state: &mut ParserState, ctx: &LineContext<'_>) {
    state.push_token(MarkdownToken::new(
        TokenKind::Text {
            text: ctx.position.rest_with_partial_tab(),
            extracted_whitespace: String::new(),
            end_whitespace: String::new(),
        },
        ctx.line_number(),
        ctx.position.index_indent + 1,
    ));
}

pub(crate) fn start_html_block(
    state: &mut ParserState,
    ctx: &LineContext<'_>,
    kind: HtmlBlockKind,
) -> Result<()> {
    log::debug!("line {}: open HTML block {kind:?}", ctx.line_number());
    let token = state.push_token(MarkdownToken::new(
        TokenKind::HtmlBlock,
        ctx.line_number(),
        ctx.position.index_indent + 1,
    ));
    push_html_text(state, ctx);
    state.stack.push(StackToken::HtmlBlock { token, kind });
    if kind.is_end_line(ctx.content()) {
        state.close_top(false, String::new(), None)?;
    }
    Ok(())
}

/// Handle a line while an HTML block is the innermost open construct.
///
/// Blank lines only reach this point for kinds that do not end at one.
pub(crate) fn continue_html_block(state: &mut ParserState, ctx: &LineContext<'_>) -> Result<()> {
    let StackToken::HtmlBlock { kind, .. } = *state.top() else {
        return Err(state.invariant(ctx.line_number(), "expected an open HTML block"));
    };

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

    push_html_text(state, ctx);
    if kind.is_end_line(ctx.rest()) {
        log::debug!("line {}: close HTML block {kind:?}", ctx.line_number());
        state.close_top(false, String::new(), None)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_kinds() {
        assert_eq!(
            try_parse_html_block_start("<!-- c", false),
            Some(HtmlBlockKind::Comment)
        );
        assert_eq!(
            try_parse_html_block_start("<?php", false),
            Some(HtmlBlockKind::ProcessingInstruction)
        );
        assert_eq!(
            try_parse_html_block_start("<!DOCTYPE html>", false),
            Some(HtmlBlockKind::Declaration)
        );
        assert_eq!(
            try_parse_html_block_start("<![CDATA[x", false),
            Some(HtmlBlockKind::CData)
        );
    }

    #[test]
    fn raw_and_block_tags() {
        assert_eq!(
            try_parse_html_block_start("<PRE class=\"x\">", false),
            Some(HtmlBlockKind::Raw)
        );
        assert_eq!(
            try_parse_html_block_start("<div>", true),
            Some(HtmlBlockKind::BlockTag)
        );
        assert_eq!(
            try_parse_html_block_start("</table>", false),
            Some(HtmlBlockKind::BlockTag)
        );
        assert_eq!(
            try_parse_html_block_start("<hr/>", false),
            Some(HtmlBlockKind::BlockTag)
        );
        assert_eq!(try_parse_html_block_start("<divx>", true), None);
    }

    #[test]
    fn complete_tags_cannot_interrupt_paragraphs() {
        assert_eq!(
            try_parse_html_block_start("<a href=\"foo\">", false),
            Some(HtmlBlockKind::CompleteTag)
        );
        assert_eq!(try_parse_html_block_start("<a href=\"foo\">", true), None);
        assert_eq!(try_parse_html_block_start("<a href=\"foo\"> x", false), None);
        assert_eq!(
            try_parse_html_block_start("</ins>  ", false),
            Some(HtmlBlockKind::CompleteTag)
        );
        assert_eq!(
            try_parse_html_block_start("</pre>", false),
            Some(HtmlBlockKind::CompleteTag)
        );
        assert_eq!(try_parse_html_block_start("</pre>", true), None);
        assert_eq!(try_parse_html_block_start("<pre", false), Some(HtmlBlockKind::Raw));
    }

    #[test]
    fn not_html() {
        assert_eq!(try_parse_html_block_start("< div>", false), None);
        assert_eq!(try_parse_html_block_start("foo <div>", false), None);
        assert_eq!(try_parse_html_block_start("<", false), None);
    }

    #[test]
    fn end_markers() {
        assert!(HtmlBlockKind::Raw.is_end_line("x </SCRIPT> y"));
        assert!(HtmlBlockKind::Comment.is_end_line("-->"));
        assert!(!HtmlBlockKind::Comment.is_end_line("->"));
        assert!(HtmlBlockKind::CData.is_end_line("]]>"));
        assert!(HtmlBlockKind::BlockTag.ends_at_blank_line());
        assert!(!HtmlBlockKind::Raw.ends_at_blank_line());
    }
}
