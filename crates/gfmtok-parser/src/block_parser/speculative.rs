//! Speculative multi-line constructs.
//!
//! Link reference definitions and tables are only known to be what they
//! look like after more lines arrive. Their lines are buffered under a
//! pending stack entry together with a checkpoint of the parser state taken
//! before each line. The construct then either commits, emitting its tokens
//! and handing unused lines back to the queue, or rolls back to the first
//! checkpoint and hands every line back with the first one marked so it is
//! not tried as the same construct again.

use super::BlockParser;
use super::leaf_dispatch::LineContext;
use super::reference_definitions::{emit_link_reference_definition, scan_link_reference_definition};
use super::tables::{emit_table, is_header_row, parse_delimiter_row, scan_table, split_table_row};
use super::utils::{is_blank, split_leading_whitespace};
use crate::error::Result;
use crate::parser_state::{Checkpoint, QueuedLine};
use crate::tabs::detabified_width;
use crate::tokens::{BufferedLine, PendingConstruct, StackToken, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpeculativeKind {
    LinkReferenceDefinition,
    Table,
}

impl SpeculativeKind {
    fn of(token: &StackToken) -> Option<Self> {
        match token {
            StackToken::LinkDefinitionPending(_) => Some(Self::LinkReferenceDefinition),
            StackToken::TablePending(_) => Some(Self::Table),
            _ => None,
        }
    }
}

/// Result of scanning the buffered lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Speculation {
    /// Leading lines that form a complete construct.
    lines_used: Option<usize>,
    can_grow: bool,
}

fn scan(kind: SpeculativeKind, pending: &PendingConstruct) -> Speculation {
    match kind {
        SpeculativeKind::LinkReferenceDefinition => {
            let scan = scan_link_reference_definition(&pending.joined_continuation(pending.lines.len()));
            Speculation {
                lines_used: scan.best.map(|definition| definition.lines_used),
                can_grow: scan.can_grow,
            }
        }
        SpeculativeKind::Table => {
            let lines: Vec<&str> = pending
                .lines
                .iter()
                .map(|line| line.continuation.as_str())
                .collect();
            let scan = scan_table(&lines);
            Speculation {
                lines_used: scan.rows,
                can_grow: scan.can_grow,
            }
        }
    }
}

impl BlockParser {
    /// Push a pending construct and buffer its first line.
    pub(super) fn start_pending(
        &mut self,
        kind: SpeculativeKind,
        ctx: &LineContext<'_>,
        checkpoint: Checkpoint,
    ) -> Result<()> {
        log::debug!("line {}: start speculative {kind:?}", ctx.line_number());
        let pending = Box::new(PendingConstruct::new(self.state.stack.len()));
        self.state.stack.push(match kind {
            SpeculativeKind::LinkReferenceDefinition => StackToken::LinkDefinitionPending(pending),
            SpeculativeKind::Table => StackToken::TablePending(pending),
        });
        self.buffer_pending_line(ctx, checkpoint)
    }

    /// A delimiter row under an open paragraph turns the paragraph's last
    /// line into the header of a table. Returns false, changing nothing, when
    /// the line and that header do not form a table.
    pub(super) fn try_table_from_paragraph(
        &mut self,
        ctx: &LineContext<'_>,
        checkpoint: Checkpoint,
    ) -> Result<bool> {
        let Some(alignments) = parse_delimiter_row(ctx.rest()) else {
            return Ok(false);
        };
        let Some(paragraph) = self.state.open_paragraph() else {
            return Ok(false);
        };
        let Some((text, line_number, column_number)) =
            self.state.document.last().and_then(|token| match &token.kind {
                TokenKind::Text { text, .. } => {
                    Some((text.clone(), token.line_number, token.column_number))
                }
                _ => None,
            })
        else {
            return Ok(false);
        };
        if !is_header_row(&text) || split_table_row(&text).len() != alignments.len() {
            return Ok(false);
        }

        log::debug!(
            "line {}: delimiter row takes line {line_number} out of the paragraph as a table header",
            ctx.line_number()
        );
        let header = BufferedLine {
            line: QueuedLine::new(line_number, text.clone()),
            continuation: text,
            column: column_number.saturating_sub(1),
            checkpoint: checkpoint.clone(),
        };
        self.state.document.pop();
        if self.state.document.len() == paragraph.0 + 1 {
            // The header was the paragraph's only line.
            self.state.document.pop();
            self.state.stack.pop();
        } else {
            self.state.close_top(true, String::new(), None)?;
        }

        let mut pending = Box::new(PendingConstruct::new(self.state.stack.len()));
        pending.lines.push(header);
        self.state.stack.push(StackToken::TablePending(pending));
        self.buffer_pending_line(ctx, checkpoint)?;
        Ok(true)
    }

    /// Add a line to the open pending construct and finalize it as soon as
    /// no further line could change the outcome.
    pub(super) fn buffer_pending_line(
        &mut self,
        ctx: &LineContext<'_>,
        checkpoint: Checkpoint,
    ) -> Result<()> {
        let line_number = ctx.line_number();
        let Some(pending) = self.state.top_mut().pending_mut() else {
            return Err(self.state.invariant(line_number, "no pending construct to buffer into"));
        };
        pending.lines.push(BufferedLine {
            line: ctx.line.clone(),
            continuation: ctx.rest().to_string(),
            column: ctx.position.index_indent,
            checkpoint,
        });

        let Some(kind) = SpeculativeKind::of(self.state.top()) else {
            return Err(self.state.invariant(line_number, "pending construct has no kind"));
        };
        let Some(pending) = self.state.top().pending() else {
            return Err(self.state.invariant(line_number, "no pending construct to scan"));
        };
        let speculation = scan(kind, pending);
        log::trace!(
            "line {line_number}: {kind:?} over {} line(s): {speculation:?}",
            pending.lines.len()
        );

        let next_is_blank = self.queue.front().is_none_or(|next| is_blank(&next.text));
        if !speculation.can_grow || next_is_blank {
            self.finalize_pending(None)?;
        }
        Ok(())
    }

    /// Commit or roll back the pending construct on top of the stack.
    ///
    /// `trigger` is the line that ended the construct without joining it; it
    /// goes back to the queue after any lines the construct did not use.
    pub(super) fn finalize_pending(&mut self, trigger: Option<QueuedLine>) -> Result<()> {
        let line_number = trigger.as_ref().map_or(0, |line| line.line_number);
        let Some(kind) = SpeculativeKind::of(self.state.top()) else {
            return Err(self.state.invariant(line_number, "no pending construct to finalize"));
        };
        let Some(pending) = self.state.top().pending() else {
            return Err(self.state.invariant(line_number, "no pending construct to finalize"));
        };
        let speculation = scan(kind, pending);

        let Some(popped) = self.state.stack.pop() else {
            return Err(self.state.invariant(line_number, "stack must not be empty"));
        };
        let mut lines = match popped {
            StackToken::LinkDefinitionPending(pending) | StackToken::TablePending(pending) => {
                pending.lines
            }
            other => {
                self.state.stack.push(other);
                return Err(self.state.invariant(line_number, "top of stack is not pending"));
            }
        };

        let mut requeue = Vec::new();
        match speculation.lines_used {
            Some(count) if count > 0 && count <= lines.len() => {
                let unused = lines.split_off(count);
                if let Some(first_unused) = unused.first() {
                    self.state.rollback(&first_unused.checkpoint);
                }
                log::debug!(
                    "commit {kind:?} of {count} line(s), {} line(s) back to the queue",
                    unused.len()
                );
                self.commit_pending(kind, &lines)?;
                requeue.extend(unused.into_iter().map(|buffered| buffered.line));
            }
            _ => {
                if let Some(first) = lines.first() {
                    self.state.rollback(&first.checkpoint);
                }
                log::debug!("roll back {kind:?}, {} line(s) back to the queue", lines.len());
                let mut replay = lines.into_iter().map(|buffered| buffered.line);
                if let Some(mut first) = replay.next() {
                    match kind {
                        SpeculativeKind::LinkReferenceDefinition => {
                            first.force_ignore_first_as_lrd = true
                        }
                        SpeculativeKind::Table => first.force_ignore_first_as_table = true,
                    }
                    requeue.push(first);
                }
                requeue.extend(replay);
            }
        }

        requeue.extend(trigger);
        self.requeue(requeue);
        Ok(())
    }

    fn commit_pending(&mut self, kind: SpeculativeKind, lines: &[BufferedLine]) -> Result<()> {
        let Some(first) = lines.first() else {
            return Ok(());
        };
        match kind {
            SpeculativeKind::LinkReferenceDefinition => {
                let joined = lines
                    .iter()
                    .map(|line| line.continuation.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                let Some(definition) = scan_link_reference_definition(&joined).best else {
                    return Err(self.state.invariant(
                        first.line.line_number,
                        "committed link definition no longer parses",
                    ));
                };
                let (leading, _) = split_leading_whitespace(&first.continuation);
                let column = detabified_width(leading, first.column) + 1;
                emit_link_reference_definition(
                    &mut self.state,
                    &mut self.link_definitions,
                    definition,
                    first.line.line_number,
                    column,
                );
            }
            SpeculativeKind::Table => emit_table(&mut self.state, lines),
        }
        Ok(())
    }
}
