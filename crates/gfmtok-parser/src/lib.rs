//! Container/leaf block tokenizer for GitHub Flavored Markdown.
//!
//! The tokenizer turns a document into a flat stream of block tokens: start
//! tokens for every block, `Text` payloads for leaf content and one `End`
//! token for every block that was opened. Container blocks (block quotes and
//! lists) keep a ledger of the prefix they consumed on every line, so the
//! original text can be reconstructed and list looseness decided.
//!
//! ```
//! use gfmtok_parser::{ParserOptions, tokenize};
//!
//! let document = tokenize("> abc\n> def\n", &ParserOptions::default()).unwrap();
//! assert_eq!(document.tokens[0].to_string(), "[block-quote(1,1)::> \\n> ]");
//! ```

pub mod block_parser;
pub mod error;
pub mod options;
pub mod parser_state;
pub mod position;
pub mod tabs;
pub mod tokens;

pub use block_parser::{BlockParser, LinkDefinition, LinkDefinitions, TokenizedDocument};
pub use error::{Result, TokenizerError};
pub use options::ParserOptions;
pub use tokens::{Alignment, LeadingSpaces, MarkdownToken, TokenId, TokenKind};

/// Tokenize a document.
///
/// `\r\n` line endings are normalized to `\n` first.
pub fn tokenize(input: &str, options: &ParserOptions) -> Result<TokenizedDocument> {
    let normalized = input.replace("\r\n", "\n");
    BlockParser::new(&normalized, options).parse()
}
