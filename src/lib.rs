pub mod config;
pub mod html;

pub use config::Config;
pub use config::ConfigBuilder;
pub use config::Extensions;
pub use gfmtok_parser::{
    LinkDefinition, LinkDefinitions, MarkdownToken, ParserOptions, TokenKind, TokenizedDocument,
    TokenizerError,
};
pub use html::transform_to_gfm;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Tokenizes a GitHub Flavored Markdown document into block tokens.
///
/// Line endings are normalized to `\n`. Extensions are taken from `config`,
/// or from the default configuration when none is given.
///
/// # Examples
///
/// ```
/// let document = gfmtok::tokenize("- item\n", None).unwrap();
/// assert_eq!(document.tokens[0].to_string(), "[ulist(1,1):-::2::- \\n]");
/// ```
pub fn tokenize(input: &str, config: Option<&Config>) -> Result<TokenizedDocument, TokenizerError> {
    #[cfg(debug_assertions)]
    {
        init_logger();
    }

    let options = config.map(Config::parser_options).unwrap_or_default();
    gfmtok_parser::tokenize(input, &options)
}

/// Tokenizes a document and renders its block structure as HTML.
pub fn render_html(input: &str, config: Option<&Config>) -> Result<String, TokenizerError> {
    let document = tokenize(input, config)?;
    Ok(transform_to_gfm(&document.tokens))
}

/// One token per line, in the tokens' text form.
pub fn dump_tokens(document: &TokenizedDocument) -> String {
    document
        .tokens
        .iter()
        .map(|token| format!("{token}\n"))
        .collect()
}
