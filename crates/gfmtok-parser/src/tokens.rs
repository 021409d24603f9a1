//! Token models: the finished token document and the parse-time stack.

pub mod markdown_token;
pub mod stack_token;

pub use markdown_token::{
    Alignment, BLANK_LINE_PLACEHOLDER, LeadingSpaces, MarkdownToken, TokenId, TokenKind,
};
pub use stack_token::{BufferedLine, ListStackData, PendingConstruct, StackToken};
