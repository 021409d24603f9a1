use crate::block_parser::{BlockParser, TokenizedDocument};
use crate::options::ParserOptions;
use crate::tokens::{MarkdownToken, TokenKind};

pub fn parse_with(input: &str, options: &ParserOptions) -> TokenizedDocument {
    BlockParser::new(input, options)
        .parse()
        .unwrap_or_else(|err| panic!("tokenizing {input:?} failed: {err}"))
}

pub fn parse_blocks(input: &str) -> TokenizedDocument {
    parse_with(input, &ParserOptions::default())
}

/// One line per token, in their text form.
pub fn dump(tokens: &[MarkdownToken]) -> Vec<String> {
    tokens.iter().map(ToString::to_string).collect()
}

pub fn assert_tokens(input: &str, expected: &[&str]) {
    let actual = dump(&parse_blocks(input).tokens);
    similar_asserts::assert_eq!(
        actual,
        expected.iter().map(|line| line.to_string()).collect::<Vec<_>>(),
        "tokens did not match for input:\n{input}"
    );
}

/// Names of the start tokens, skipping `End`, `Text` and blank lines.
pub fn block_names(input: &str) -> Vec<&'static str> {
    parse_blocks(input)
        .tokens
        .iter()
        .filter(|token| !token.is_end() && !token.is_blank())
        .filter(|token| !matches!(token.kind, TokenKind::Text { .. }))
        .map(|token| token.kind.name())
        .collect()
}

/// Text payload of the first `Text` token.
pub fn first_text(input: &str) -> Option<String> {
    parse_blocks(input)
        .tokens
        .into_iter()
        .find_map(|token| match token.kind {
            TokenKind::Text { text, .. } => Some(text),
            _ => None,
        })
}
