//! Parser options.

/// Extensions the tokenizer recognizes on top of CommonMark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "kebab-case")
)]
pub struct ParserOptions {
    /// GFM pipe tables.
    pub tables: bool,
    /// Front matter delimited by `---` at the start of the document.
    pub front_matter: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            tables: true,
            front_matter: false,
        }
    }
}
