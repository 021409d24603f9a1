//! Hands the rest of a line to the leaf block processors once the
//! containers have taken their prefix.

use super::BlockParser;
use super::code_blocks::{continue_fenced_code_block, start_fenced_code_block, try_parse_fence_open};
use super::headings::{emit_atx_heading, emit_setext_heading, try_parse_atx_heading, try_parse_setext_underline};
use super::horizontal_rules::{emit_thematic_break, try_parse_thematic_break};
use super::html_blocks::{continue_html_block, start_html_block, try_parse_html_block_start};
use super::indented_code::{
    CODE_INDENT, continue_indented_code_block, is_indented_code_line, start_indented_code_block,
};
use super::paragraphs::{continue_paragraph, start_paragraph};
use super::speculative::SpeculativeKind;
use super::tables::has_unescaped_pipe;
use crate::error::Result;
use crate::parser_state::{Checkpoint, QueuedLine};
use crate::position::PositionMarker;
use crate::tokens::{MarkdownToken, StackToken, TokenKind};

/// The line being processed, seen from where the containers left off.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineContext<'a> {
    pub line: &'a QueuedLine,
    pub position: PositionMarker<'a>,
}

impl<'a> LineContext<'a> {
    pub fn new(line: &'a QueuedLine, position: PositionMarker<'a>) -> Self {
        Self { line, position }
    }

    pub fn line_number(&self) -> usize {
        self.line.line_number
    }

    /// Literal whitespace between the position and the first non-space.
    pub fn leading_whitespace(&self) -> &'a str {
        let (index, _) = self.position.first_nonspace();
        &self.position.text_to_parse[self.position.index_number..index]
    }

    /// Text from the first non-space to the end of the line.
    pub fn content(&self) -> &'a str {
        let (index, _) = self.position.first_nonspace();
        &self.position.text_to_parse[index..]
    }

    /// One-based column of the first non-space.
    pub fn content_column(&self) -> usize {
        self.position.first_nonspace().1 + 1
    }

    pub fn indent(&self) -> usize {
        self.position.indent()
    }

    pub fn is_blank(&self) -> bool {
        self.position.is_blank()
    }

    pub fn rest(&self) -> &'a str {
        self.position.rest()
    }
}

/// What a line does to the open paragraph and containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineContinuationKind {
    /// Every open container matched.
    Fresh,
    /// Containers are missing, but the line continues the open paragraph.
    LazyParagraphContinuation,
    /// Containers are missing and must be closed before the line is parsed.
    ForcedClose,
}

/// True if a leaf block that can interrupt a paragraph starts at `pos`.
///
/// Setext underlines and list markers are left out: both need an open
/// paragraph in the matched containers to mean anything here.
pub(crate) fn starts_interrupting_leaf(pos: &PositionMarker<'_>) -> bool {
    if pos.indent() >= CODE_INDENT {
        return false;
    }
    let (index, _) = pos.first_nonspace();
    let content = &pos.text_to_parse[index..];
    try_parse_atx_heading(content).is_some()
        || try_parse_fence_open(content).is_some()
        || try_parse_html_block_start(content, true).is_some()
        || try_parse_thematic_break(content).is_some()
}

impl BlockParser {
    /// Close the open paragraph because another leaf starts on this line.
    fn close_interrupted_paragraph(&mut self) -> Result<()> {
        if self.state.top().is_paragraph() {
            self.state.close_top(true, String::new(), None)?;
        }
        Ok(())
    }

    /// Feed the line to the open code or HTML block.
    pub(super) fn continue_leaf(&mut self, ctx: &LineContext<'_>) -> Result<()> {
        let top = self.state.top();
        if matches!(top, StackToken::FencedCodeBlock { .. }) {
            continue_fenced_code_block(&mut self.state, ctx)
        } else if matches!(top, StackToken::IndentedCodeBlock { .. }) {
            continue_indented_code_block(&mut self.state, ctx)
        } else if matches!(top, StackToken::HtmlBlock { .. }) {
            continue_html_block(&mut self.state, ctx)
        } else {
            let name = top.name();
            Err(self.state.invariant(
                ctx.line_number(),
                format!("{name} cannot take a line verbatim"),
            ))
        }
    }

    /// Start or continue the leaf block on this line.
    pub(super) fn dispatch_leaf(
        &mut self,
        ctx: &LineContext<'_>,
        checkpoint: Option<Checkpoint>,
    ) -> Result<()> {
        let line_number = ctx.line_number();
        if ctx.is_blank() {
            self.state.push_token(MarkdownToken::new(
                TokenKind::BlankLine {
                    extracted_whitespace: ctx.rest().to_string(),
                },
                line_number,
                ctx.position.index_indent + 1,
            ));
            return Ok(());
        }

        let in_paragraph = self.state.top().is_paragraph();
        let content = ctx.content();
        let indent = ctx.indent();

        if indent < CODE_INDENT {
            if !in_paragraph
                && !ctx.line.force_ignore_first_as_lrd
                && content.starts_with('[')
                && let Some(checkpoint) = checkpoint.clone()
            {
                return self.start_pending(SpeculativeKind::LinkReferenceDefinition, ctx, checkpoint);
            }
            if let Some(kind) = try_parse_html_block_start(content, in_paragraph) {
                self.close_interrupted_paragraph()?;
                return start_html_block(&mut self.state, ctx, kind);
            }
            if let Some(heading) = try_parse_atx_heading(content) {
                self.close_interrupted_paragraph()?;
                emit_atx_heading(&mut self.state, ctx, &heading);
                return Ok(());
            }
        }

        if !in_paragraph && is_indented_code_line(ctx) {
            start_indented_code_block(&mut self.state, ctx);
            return Ok(());
        }

        if indent < CODE_INDENT {
            if let Some(fence) = try_parse_fence_open(content) {
                self.close_interrupted_paragraph()?;
                start_fenced_code_block(&mut self.state, ctx, &fence);
                return Ok(());
            }
            if in_paragraph && let Some(underline) = try_parse_setext_underline(content) {
                return emit_setext_heading(&mut self.state, ctx, underline);
            }
            if in_paragraph
                && self.options.tables
                && let Some(checkpoint) = checkpoint.clone()
                && self.try_table_from_paragraph(ctx, checkpoint)?
            {
                return Ok(());
            }
            if let Some(rule_char) = try_parse_thematic_break(content) {
                self.close_interrupted_paragraph()?;
                emit_thematic_break(&mut self.state, ctx, rule_char);
                return Ok(());
            }
            if !in_paragraph
                && self.options.tables
                && !ctx.line.force_ignore_first_as_table
                && has_unescaped_pipe(content)
                && let Some(checkpoint) = checkpoint
            {
                return self.start_pending(SpeculativeKind::Table, ctx, checkpoint);
            }
        }

        if in_paragraph {
            continue_paragraph(&mut self.state, ctx);
        } else {
            start_paragraph(&mut self.state, ctx);
        }
        Ok(())
    }
}
