use std::collections::VecDeque;

use crate::error::Result;
use crate::options::ParserOptions;
use crate::parser_state::{ParserState, QueuedLine};
use crate::tokens::{MarkdownToken, StackToken};

mod blockquotes;
mod code_blocks;
mod coalesce;
mod containers;
mod front_matter;
mod headings;
mod horizontal_rules;
mod html_blocks;
mod indented_code;
mod leaf_dispatch;
mod lists;
mod paragraphs;
pub mod reference_definitions; // Public for the definition registry
mod speculative;
mod tables;
mod utils;

use blockquotes::open_block_quote;
use coalesce::coalesce_text_tokens;
use containers::{ContainerPlan, LeafState, NewContainer, plan_containers};
use front_matter::{emit_front_matter, try_parse_front_matter};
use leaf_dispatch::{LineContext, LineContinuationKind, starts_interrupting_leaf};
use lists::{new_list_item, open_list};
use paragraphs::continue_paragraph;
pub use html_blocks::HtmlBlockKind;
pub use reference_definitions::{LinkDefinition, LinkDefinitions, normalize_label};
use utils::split_lines;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The tokens of a document together with the link definitions found in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TokenizedDocument {
    pub tokens: Vec<MarkdownToken>,
    pub link_definitions: LinkDefinitions,
}

pub struct BlockParser {
    queue: VecDeque<QueuedLine>,
    /// Number of the last physical line.
    line_count: usize,
    state: ParserState,
    link_definitions: LinkDefinitions,
    options: ParserOptions,
}

impl BlockParser {
    pub fn new(input: &str, options: &ParserOptions) -> Self {
        let queue: VecDeque<QueuedLine> = split_lines(input)
            .into_iter()
            .enumerate()
            .map(|(index, text)| QueuedLine::new(index + 1, text))
            .collect();
        Self {
            line_count: queue.len(),
            queue,
            state: ParserState::new(),
            link_definitions: LinkDefinitions::new(),
            options: *options,
        }
    }

    pub fn parse(mut self) -> Result<TokenizedDocument> {
        #[cfg(debug_assertions)]
        {
            init_logger();
        }

        log::debug!("Starting document parse: {} line(s)", self.queue.len());

        if self.options.front_matter {
            self.parse_front_matter();
        }

        loop {
            if let Some(line) = self.queue.pop_front() {
                let line_number = line.line_number;
                log::debug!("Parsing line {line_number}: {:?}", line.text);
                self.process_line(line)
                    .map_err(|err| err.at_line(line_number, self.state.stack_shape()))?;

                #[cfg(debug_assertions)]
                self.state.verify_consistency(line_number)?;
            } else if self.state.top().is_pending() {
                self.finalize_pending(None)?;
            } else {
                break;
            }
        }

        self.state.close_stack_to(1, true)?;
        let tokens = coalesce_text_tokens(std::mem::take(&mut self.state.document))?;
        log::debug!("Finished document parse: {} token(s)", tokens.len());
        Ok(TokenizedDocument {
            tokens,
            link_definitions: self.link_definitions,
        })
    }

    fn parse_front_matter(&mut self) {
        let front_matter = {
            let lines: Vec<&str> = self.queue.iter().map(|line| line.text.as_str()).collect();
            try_parse_front_matter(&lines)
        };
        if let Some(front_matter) = front_matter {
            self.queue.drain(..front_matter.line_count());
            emit_front_matter(&mut self.state, front_matter);
        }
    }

    /// Put lines back at the front of the queue, keeping their order.
    fn requeue(&mut self, lines: Vec<QueuedLine>) {
        if !lines.is_empty() {
            log::trace!(
                "requeue lines {:?}",
                lines.iter().map(|line| line.line_number).collect::<Vec<_>>()
            );
        }
        for line in lines.into_iter().rev() {
            self.queue.push_front(line);
        }
    }

    fn process_line(&mut self, line: QueuedLine) -> Result<()> {
        let line_number = line.line_number;
        if self.is_final_empty_line(&line) && self.top_takes_blank_lines_as_content() {
            log::debug!("line {line_number}: end of input closes {}", self.state.top().name());
            self.state.close_top(true, String::new(), None)?;
        }
        let pending = self.state.top().is_pending();
        let checkpoint = (pending || line.text.contains(['[', '|'])).then(|| self.state.checkpoint());
        let plan = plan_containers(&self.state, &line.text, line_number);

        if pending {
            if plan.all_matched()
                && plan.new_containers.is_empty()
                && !plan.is_blank()
                && !starts_interrupting_leaf(&plan.after_matched)
            {
                let Some(checkpoint) = checkpoint else {
                    return Err(self.state.invariant(line_number, "pending line without checkpoint"));
                };
                self.commit_matched(&plan, line_number)?;
                self.buffer_pending_line(&LineContext::new(&line, plan.after_matched), checkpoint)?;
                self.update_list_items(false);
                return Ok(());
            }
            return self.finalize_pending(Some(line.clone()));
        }

        if plan.leaf_takes_line(&self.state) {
            self.commit_matched(&plan, line_number)?;
            self.continue_leaf(&LineContext::new(&line, plan.after_matched))?;
            self.update_list_items(plan.is_blank());
            return Ok(());
        }

        let kind = classify_line(&plan);
        log::debug!("line {line_number}: {kind:?}");
        match kind {
            LineContinuationKind::LazyParagraphContinuation => {
                return self.continue_lazily(&line, &plan);
            }
            LineContinuationKind::ForcedClose => {
                self.state.close_stack_to(plan.close_depth(), true)?;
            }
            LineContinuationKind::Fresh => {
                if plan.leaf == LeafState::Fails {
                    // A paragraph or HTML block ended by a blank line closes
                    // normally; anything else is cut short.
                    let normal_end = plan.is_blank()
                        && (self.state.top().is_paragraph()
                            || matches!(self.state.top(), StackToken::HtmlBlock { .. }));
                    self.state.close_top(!normal_end, String::new(), None)?;
                } else if !plan.new_containers.is_empty() && self.state.top().is_paragraph() {
                    self.state.close_top(true, String::new(), None)?;
                }
            }
        }

        self.commit_matched(&plan, line_number)?;
        self.open_new_containers(&plan)?;
        self.dispatch_leaf(&LineContext::new(&line, plan.position), checkpoint)?;
        self.update_list_items(plan.is_blank());
        Ok(())
    }

    /// The empty remainder after the document's final newline.
    fn is_final_empty_line(&self, line: &QueuedLine) -> bool {
        line.line_number == self.line_count && line.text.is_empty()
    }

    /// Fenced code and HTML blocks that only end at a marker would keep a
    /// blank line as content.
    fn top_takes_blank_lines_as_content(&self) -> bool {
        match self.state.top() {
            StackToken::FencedCodeBlock { .. } => true,
            StackToken::HtmlBlock { kind, .. } => !kind.ends_at_blank_line(),
            _ => false,
        }
    }

    /// Continue the open paragraph although some containers did not match.
    fn continue_lazily(&mut self, line: &QueuedLine, plan: &ContainerPlan<'_>) -> Result<()> {
        let line_number = line.line_number;
        self.commit_matched(plan, line_number)?;
        for index in plan.first_unmatched..plan.containers_end {
            let Some(token) = self
                .state
                .stack
                .get(index)
                .and_then(|entry| entry.matching_markdown_token())
            else {
                return Err(self.state.invariant(line_number, "unmatched container has no token"));
            };
            self.state
                .record_leading_spaces(token, String::new(), "", line_number)?;
        }
        let ctx = LineContext::new(line, plan.after_matched);
        continue_paragraph(&mut self.state, &ctx);
        self.update_list_items(false);
        Ok(())
    }

    /// Record what every matched container consumed on this line.
    fn commit_matched(&mut self, plan: &ContainerPlan<'_>, line_number: usize) -> Result<()> {
        for matched in &plan.matched {
            let Some(entry) = self.state.stack.get_mut(matched.stack_index) else {
                return Err(self.state.invariant(
                    line_number,
                    format!("matched container {} is not on the stack", matched.stack_index),
                ));
            };
            if matched.closes_empty_item
                && let Some(data) = entry.list_data_mut()
            {
                data.item_closed = true;
            }
            let Some(token) = entry.matching_markdown_token() else {
                return Err(self.state.invariant(line_number, "matched container has no token"));
            };
            let consumed = matched.end.consumed_since(&matched.start);
            self.state
                .record_leading_spaces(token, consumed.detabified, consumed.literal, line_number)?;
        }
        Ok(())
    }

    fn open_new_containers(&mut self, plan: &ContainerPlan<'_>) -> Result<()> {
        for (index, container) in plan.new_containers.iter().enumerate() {
            match container {
                NewContainer::BlockQuote { start, end } => {
                    open_block_quote(&mut self.state, start, end)?;
                }
                NewContainer::ListItem { start, item } if index == 0 && plan.sibling_item => {
                    new_list_item(&mut self.state, plan.first_unmatched, start, item)?;
                }
                NewContainer::ListItem { start, item } => {
                    open_list(&mut self.state, start, item)?;
                }
            }
        }
        Ok(())
    }

    /// Track whether each open list item has had content yet.
    fn update_list_items(&mut self, line_is_blank: bool) {
        let depth = self.state.stack.len();
        for (index, entry) in self.state.stack.iter_mut().enumerate() {
            if let Some(data) = entry.list_data_mut()
                && (index + 1 < depth || !line_is_blank)
            {
                data.item_has_content = true;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &ParserState {
        &self.state
    }
}

fn classify_line(plan: &ContainerPlan<'_>) -> LineContinuationKind {
    if plan.is_lazy_candidate() && !starts_interrupting_leaf(&plan.after_matched) {
        LineContinuationKind::LazyParagraphContinuation
    } else if !plan.all_matched() {
        LineContinuationKind::ForcedClose
    } else {
        LineContinuationKind::Fresh
    }
}
