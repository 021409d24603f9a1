//! Open constructs, innermost last.

use super::markdown_token::TokenId;
use crate::block_parser::HtmlBlockKind;
use crate::parser_state::{Checkpoint, QueuedLine};
use crate::tokens::markdown_token::MarkdownToken;

/// State of one open list.
///
/// `indent_level` is the absolute column the current item's content starts
/// at; `content_offset` is the same distance measured from where the list's
/// enclosing container left off, which is what continuation lines are
/// compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListStackData {
    pub token: TokenId,
    pub last_new_item: Option<TokenId>,
    pub indent_level: usize,
    pub content_offset: usize,
    pub list_character: char,
    pub ws_before_marker: usize,
    pub marker_width: usize,
    pub ws_after_marker: usize,
    pub item_has_content: bool,
    /// Set when an item that started empty is followed by a blank line;
    /// such an item cannot take any more content.
    pub item_closed: bool,
}

impl ListStackData {
    pub fn is_same_list(&self, other_character: char) -> bool {
        self.list_character == other_character
    }
}

/// One line held back while a speculative construct decides.
#[derive(Debug, Clone)]
pub struct BufferedLine {
    pub line: QueuedLine,
    /// Text left after the containers took their prefix.
    pub continuation: String,
    /// Column `continuation` starts at.
    pub column: usize,
    /// Parser state before this line was touched.
    pub checkpoint: Checkpoint,
}

/// A link reference definition or table that has not been confirmed yet.
#[derive(Debug, Clone)]
pub struct PendingConstruct {
    /// Depth of the stack underneath the pending token.
    pub container_depth: usize,
    pub lines: Vec<BufferedLine>,
}

impl PendingConstruct {
    pub fn new(container_depth: usize) -> Self {
        Self {
            container_depth,
            lines: Vec::new(),
        }
    }

    pub fn joined_continuation(&self, count: usize) -> String {
        self.lines
            .iter()
            .take(count)
            .map(|line| line.continuation.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone)]
pub enum StackToken {
    Document,
    BlockQuote {
        token: TokenId,
    },
    UnorderedList(ListStackData),
    OrderedList(ListStackData),
    FencedCodeBlock {
        token: TokenId,
        fence_character: char,
        fence_count: usize,
        indent_budget: usize,
    },
    IndentedCodeBlock {
        token: TokenId,
        /// Blank lines seen since the last code line. They belong to the
        /// block only if another code line follows.
        held_blank_lines: Vec<MarkdownToken>,
    },
    HtmlBlock {
        token: TokenId,
        kind: HtmlBlockKind,
    },
    Paragraph {
        token: TokenId,
    },
    LinkDefinitionPending(Box<PendingConstruct>),
    TablePending(Box<PendingConstruct>),
}

impl StackToken {
    /// Document token this stack entry was opened with.
    ///
    /// The document root and pending constructs have none: a pending
    /// construct emits its tokens only once it is confirmed.
    pub fn matching_markdown_token(&self) -> Option<TokenId> {
        match self {
            StackToken::Document
            | StackToken::LinkDefinitionPending(_)
            | StackToken::TablePending(_) => None,
            StackToken::BlockQuote { token }
            | StackToken::FencedCodeBlock { token, .. }
            | StackToken::IndentedCodeBlock { token, .. }
            | StackToken::HtmlBlock { token, .. }
            | StackToken::Paragraph { token } => Some(*token),
            StackToken::UnorderedList(data) | StackToken::OrderedList(data) => Some(data.token),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StackToken::Document => "document",
            StackToken::BlockQuote { .. } => "block-quote",
            StackToken::UnorderedList(_) => "ulist",
            StackToken::OrderedList(_) => "olist",
            StackToken::FencedCodeBlock { .. } => "fcode-block",
            StackToken::IndentedCodeBlock { .. } => "icode-block",
            StackToken::HtmlBlock { .. } => "html-block",
            StackToken::Paragraph { .. } => "para",
            StackToken::LinkDefinitionPending(_) => "link-ref-def-pending",
            StackToken::TablePending(_) => "table-pending",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            StackToken::BlockQuote { .. } | StackToken::UnorderedList(_) | StackToken::OrderedList(_)
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, StackToken::UnorderedList(_) | StackToken::OrderedList(_))
    }

    pub fn is_block_quote(&self) -> bool {
        matches!(self, StackToken::BlockQuote { .. })
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self, StackToken::Paragraph { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            StackToken::LinkDefinitionPending(_) | StackToken::TablePending(_)
        )
    }

    pub fn list_data(&self) -> Option<&ListStackData> {
        match self {
            StackToken::UnorderedList(data) | StackToken::OrderedList(data) => Some(data),
            _ => None,
        }
    }

    pub fn list_data_mut(&mut self) -> Option<&mut ListStackData> {
        match self {
            StackToken::UnorderedList(data) | StackToken::OrderedList(data) => Some(data),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingConstruct> {
        match self {
            StackToken::LinkDefinitionPending(pending) | StackToken::TablePending(pending) => {
                Some(pending)
            }
            _ => None,
        }
    }

    pub fn pending_mut(&mut self) -> Option<&mut PendingConstruct> {
        match self {
            StackToken::LinkDefinitionPending(pending) | StackToken::TablePending(pending) => {
                Some(pending)
            }
            _ => None,
        }
    }
}
