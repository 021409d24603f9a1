//! Container matching for one line.
//!
//! Before anything is changed, the line is walked against the open block
//! quotes and list items, and any new container markers are collected. The
//! result is a plan the driver applies once it knows what the line is; until
//! then no ledger entry is written and no token is emitted.

use super::blockquotes::try_parse_blockquote_marker;
use super::headings::try_parse_setext_underline;
use super::horizontal_rules::try_parse_thematic_break;
use super::indented_code::CODE_INDENT;
use super::lists::{
    ListContinuation, ListItemStart, markers_match, match_list_continuation, try_parse_list_marker,
};
use crate::parser_state::ParserState;
use crate::position::PositionMarker;
use crate::tokens::StackToken;

/// An open container that accepted this line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MatchedContainer<'a> {
    pub stack_index: usize,
    pub start: PositionMarker<'a>,
    pub end: PositionMarker<'a>,
    /// The blank line matched an item that never had content.
    pub closes_empty_item: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NewContainer<'a> {
    BlockQuote {
        start: PositionMarker<'a>,
        end: PositionMarker<'a>,
    },
    ListItem {
        start: PositionMarker<'a>,
        item: ListItemStart<'a>,
    },
}

/// How the innermost open leaf relates to this line, when every container
/// matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LeafState {
    /// No leaf is open, or not every container matched.
    NotReached,
    Continues,
    Fails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContainerPlan<'a> {
    pub matched: Vec<MatchedContainer<'a>>,
    /// Stack index of the first container that did not match; equal to
    /// `containers_end` when all of them did.
    pub first_unmatched: usize,
    /// Stack index just past the last open container.
    pub containers_end: usize,
    /// Position after the matched containers.
    pub after_matched: PositionMarker<'a>,
    pub leaf: LeafState,
    pub tip_is_paragraph: bool,
    pub new_containers: Vec<NewContainer<'a>>,
    /// The first new container is another item of the list at
    /// `first_unmatched`.
    pub sibling_item: bool,
    /// Position after all containers, old and new.
    pub position: PositionMarker<'a>,
}

impl ContainerPlan<'_> {
    pub fn all_matched(&self) -> bool {
        self.first_unmatched == self.containers_end
    }

    pub fn is_blank(&self) -> bool {
        self.position.is_blank()
    }

    /// The open leaf takes the rest of the line as it is: no new container
    /// can start inside a fenced code block, HTML block or indented code.
    pub fn leaf_takes_line(&self, state: &ParserState) -> bool {
        self.all_matched()
            && self.leaf == LeafState::Continues
            && matches!(
                state.stack.get(self.containers_end),
                Some(
                    StackToken::FencedCodeBlock { .. }
                        | StackToken::IndentedCodeBlock { .. }
                        | StackToken::HtmlBlock { .. }
                )
            )
    }

    /// A paragraph is open, some container did not match and nothing new
    /// starts: the line may continue the paragraph lazily.
    pub fn is_lazy_candidate(&self) -> bool {
        self.tip_is_paragraph
            && !self.all_matched()
            && self.new_containers.is_empty()
            && !self.is_blank()
    }

    /// Stack depth to close down to before the new containers are opened.
    pub fn close_depth(&self) -> usize {
        if self.sibling_item {
            self.first_unmatched + 1
        } else {
            self.first_unmatched
        }
    }
}

fn leaf_continues(leaf: &StackToken, pos: &PositionMarker<'_>) -> bool {
    let blank = pos.is_blank();
    match leaf {
        StackToken::Paragraph { .. } => !blank,
        StackToken::FencedCodeBlock { .. } => true,
        StackToken::IndentedCodeBlock { .. } => blank || pos.indent() >= CODE_INDENT,
        StackToken::HtmlBlock { kind, .. } => !(blank && kind.ends_at_blank_line()),
        StackToken::LinkDefinitionPending(_) | StackToken::TablePending(_) => true,
        _ => false,
    }
}

fn match_container<'a>(
    token: &StackToken,
    pos: &PositionMarker<'a>,
) -> Option<(PositionMarker<'a>, bool)> {
    if token.is_block_quote() {
        return try_parse_blockquote_marker(pos).map(|end| (end, false));
    }
    match match_list_continuation(token.list_data()?, pos) {
        ListContinuation::Matched(end) => Some((end, false)),
        ListContinuation::ClosesEmptyItem(end) => Some((end, true)),
        ListContinuation::Unmatched => None,
    }
}

/// Walk the line against the open containers and look for new ones.
pub(crate) fn plan_containers<'a>(
    state: &ParserState,
    line: &'a str,
    line_number: usize,
) -> ContainerPlan<'a> {
    let containers_end = 1 + state
        .stack
        .iter()
        .skip(1)
        .take_while(|token| token.is_container())
        .count();

    let mut pos = PositionMarker::new(line_number, line);
    let mut matched = Vec::new();
    let mut first_unmatched = containers_end;
    for (stack_index, token) in state.stack.iter().enumerate().take(containers_end).skip(1) {
        let Some((end, closes_empty_item)) = match_container(token, &pos) else {
            first_unmatched = stack_index;
            break;
        };
        matched.push(MatchedContainer {
            stack_index,
            start: pos,
            end,
            closes_empty_item,
        });
        pos = end;
    }
    let after_matched = pos;

    let tip = state.stack.get(containers_end);
    let tip_is_paragraph = tip.is_some_and(StackToken::is_paragraph);
    let leaf = match tip {
        Some(leaf) if first_unmatched == containers_end => {
            if leaf_continues(leaf, &after_matched) {
                LeafState::Continues
            } else {
                LeafState::Fails
            }
        }
        _ => LeafState::NotReached,
    };

    let mut plan = ContainerPlan {
        matched,
        first_unmatched,
        containers_end,
        after_matched,
        leaf,
        tip_is_paragraph,
        new_containers: Vec::new(),
        sibling_item: false,
        position: after_matched,
    };

    if !plan.leaf_takes_line(state) {
        collect_new_containers(&mut plan);
    }

    plan.sibling_item = match (plan.new_containers.first(), state.stack.get(first_unmatched)) {
        (Some(NewContainer::ListItem { item, .. }), Some(token))
            if first_unmatched < containers_end =>
        {
            let ordered = matches!(token, StackToken::OrderedList(_));
            token
                .list_data()
                .is_some_and(|data| markers_match(data, ordered, &item.marker))
        }
        _ => false,
    };

    log::debug!(
        "line {line_number}: matched {}/{} container(s), {} new, leaf {:?}",
        plan.first_unmatched - 1,
        plan.containers_end - 1,
        plan.new_containers.len(),
        plan.leaf,
    );
    plan
}

fn collect_new_containers(plan: &mut ContainerPlan<'_>) {
    let mut interrupts_paragraph =
        plan.all_matched() && plan.tip_is_paragraph && plan.leaf == LeafState::Continues;
    let mut pos = plan.after_matched;

    while pos.indent() < CODE_INDENT {
        if let Some(end) = try_parse_blockquote_marker(&pos) {
            plan.new_containers
                .push(NewContainer::BlockQuote { start: pos, end });
            pos = end;
            interrupts_paragraph = false;
            continue;
        }

        let (index, _) = pos.first_nonspace();
        let content = &pos.text_to_parse[index..];
        if interrupts_paragraph && try_parse_setext_underline(content).is_some() {
            break;
        }
        if try_parse_thematic_break(content).is_some() {
            break;
        }
        let Some(item) = try_parse_list_marker(&pos, interrupts_paragraph) else {
            break;
        };
        let next = item.content_start;
        plan.new_containers
            .push(NewContainer::ListItem { start: pos, item });
        pos = next;
        interrupts_paragraph = false;
    }

    plan.position = pos;
}
