//! Error type for the tokenizer.
//!
//! Markdown has no syntax errors: every input produces a token stream. The
//! variants here describe bugs in the tokenizer's own reasoning, reported
//! with enough context to file an issue.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    #[error("bad tokenization at line {line_number}: {reason} (stack: {stack})")]
    BadTokenization {
        line_number: usize,
        reason: String,
        stack: String,
    },

    #[error("detabified text {target:?} is not a prefix of {original:?}")]
    DetabifiedPrefixNotFound { target: String, original: String },

    #[error("speculative {construct} closed without being committed or rolled back")]
    PendingNotFinalized { construct: &'static str },
}

impl TokenizerError {
    /// Attach line and stack context to an error raised below the driver.
    pub(crate) fn at_line(self, line_number: usize, stack: String) -> Self {
        match self {
            Self::BadTokenization { .. } => self,
            other => Self::BadTokenization {
                line_number,
                reason: other.to_string(),
                stack,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, TokenizerError>;
