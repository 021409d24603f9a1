//! Per-document parser state: the open-construct stack and the token arena.

use crate::error::{Result, TokenizerError};
use crate::tokens::{LeadingSpaces, MarkdownToken, StackToken, TokenId, TokenKind};

/// A physical line waiting to be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedLine {
    pub line_number: usize,
    pub text: String,
    pub force_ignore_first_as_lrd: bool,
    pub force_ignore_first_as_table: bool,
}

impl QueuedLine {
    pub fn new(line_number: usize, text: impl Into<String>) -> Self {
        Self {
            line_number,
            text: text.into(),
            force_ignore_first_as_lrd: false,
            force_ignore_first_as_table: false,
        }
    }
}

/// Everything needed to undo the effects of a run of lines.
///
/// Tokens are only ever appended to the document, and the only in-place
/// mutation of existing tokens during speculative lines is the container
/// ledgers, so a stack copy, the document length and the ledger lengths are
/// enough to restore the earlier state exactly.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    stack: Vec<StackToken>,
    document_len: usize,
    ledger_lens: Vec<(TokenId, usize)>,
}

impl Checkpoint {
    pub fn document_len(&self) -> usize {
        self.document_len
    }
}

#[derive(Debug)]
pub struct ParserState {
    pub stack: Vec<StackToken>,
    pub document: Vec<MarkdownToken>,
}

impl Default for ParserState {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserState {
    pub fn new() -> Self {
        Self {
            stack: vec![StackToken::Document],
            document: Vec::new(),
        }
    }

    pub fn push_token(&mut self, token: MarkdownToken) -> TokenId {
        self.document.push(token);
        TokenId(self.document.len() - 1)
    }

    pub fn token(&self, id: TokenId) -> Option<&MarkdownToken> {
        self.document.get(id.0)
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut MarkdownToken> {
        self.document.get_mut(id.0)
    }

    pub fn top(&self) -> &StackToken {
        // The document root is never popped.
        &self.stack[self.stack.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut StackToken {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// Record the prefix a container consumed on the current line.
    pub fn record_leading_spaces(
        &mut self,
        container: TokenId,
        detabified: String,
        literal: &str,
        line_number: usize,
    ) -> Result<()> {
        let stack = self.stack_shape();
        let ledger = self
            .document
            .get_mut(container.0)
            .and_then(|token| token.kind.leading_spaces_mut())
            .ok_or_else(|| TokenizerError::BadTokenization {
                line_number,
                reason: format!("token {} has no leading-spaces ledger", container.0),
                stack,
            })?;
        log::trace!(
            "line {line_number}: ledger of token {} += {detabified:?}",
            container.0
        );
        ledger.push(detabified, literal);
        Ok(())
    }

    pub fn ledger(&self, container: TokenId) -> Option<&LeadingSpaces> {
        self.token(container)
            .and_then(|token| token.kind.leading_spaces())
    }

    pub fn checkpoint(&self) -> Checkpoint {
        let stack: Vec<StackToken> = self
            .stack
            .iter()
            .filter(|token| !token.is_pending())
            .cloned()
            .collect();
        let ledger_lens = stack
            .iter()
            .filter(|token| token.is_container())
            .filter_map(|token| token.matching_markdown_token())
            .filter_map(|id| self.ledger(id).map(|ledger| (id, ledger.len())))
            .collect();
        Checkpoint {
            stack,
            document_len: self.document.len(),
            ledger_lens,
        }
    }

    pub fn rollback(&mut self, checkpoint: &Checkpoint) {
        log::debug!(
            "rollback: document {} -> {}, stack {} -> {}",
            self.document.len(),
            checkpoint.document_len,
            self.stack.len(),
            checkpoint.stack.len()
        );
        self.document.truncate(checkpoint.document_len);
        for (id, len) in &checkpoint.ledger_lens {
            if let Some(ledger) = self
                .document
                .get_mut(id.0)
                .and_then(|token| token.kind.leading_spaces_mut())
            {
                ledger.truncate(*len);
            }
        }
        self.stack = checkpoint.stack.clone();
    }

    /// Close stack entries until `depth` remain, emitting one `End` per entry.
    pub fn close_stack_to(&mut self, depth: usize, was_forced: bool) -> Result<()> {
        while self.stack.len() > depth.max(1) {
            self.close_top(was_forced, String::new(), None)?;
        }
        Ok(())
    }

    /// Pop the innermost construct and append its `End` token.
    pub fn close_top(
        &mut self,
        was_forced: bool,
        extracted_whitespace: String,
        extra_end_data: Option<String>,
    ) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(self.invariant(0, "the document root cannot be closed"));
        }
        let Some(popped) = self.stack.pop() else {
            return Err(self.invariant(0, "stack must not be empty"));
        };
        if popped.is_pending() {
            let construct = popped.name();
            self.stack.push(popped);
            return Err(TokenizerError::PendingNotFinalized { construct });
        }
        let Some(start) = popped.matching_markdown_token() else {
            return Err(self.invariant(0, "closed stack token has no matching token"));
        };
        let name = self
            .token(start)
            .map(|token| token.kind.name())
            .unwrap_or(popped.name());
        log::debug!("close {name} (token {}, forced={was_forced})", start.0);
        self.push_token(MarkdownToken::end(
            start,
            name,
            extracted_whitespace,
            extra_end_data,
            was_forced,
        ));
        if let StackToken::IndentedCodeBlock {
            held_blank_lines, ..
        } = popped
        {
            self.document.extend(held_blank_lines);
        }
        Ok(())
    }

    /// Index of the innermost paragraph-like leaf, if it is the top entry.
    pub fn open_paragraph(&self) -> Option<TokenId> {
        match self.top() {
            StackToken::Paragraph { token } => Some(*token),
            _ => None,
        }
    }

    /// Readable stack shape for diagnostics.
    pub fn stack_shape(&self) -> String {
        let names: Vec<String> = self
            .stack
            .iter()
            .map(|token| match token.list_data() {
                Some(data) => format!("{}({})", token.name(), data.indent_level),
                None => token.name().to_string(),
            })
            .collect();
        format!("[{}]", names.join(", "))
    }

    pub fn invariant(&self, line_number: usize, reason: impl Into<String>) -> TokenizerError {
        TokenizerError::BadTokenization {
            line_number,
            reason: reason.into(),
            stack: self.stack_shape(),
        }
    }

    /// A ledger holds at most one entry per line since its container opened,
    /// and its cursor and tab side-table stay within the entries.
    fn verify_ledger(
        &self,
        line_number: usize,
        token: &MarkdownToken,
        ledger: &LeadingSpaces,
    ) -> Result<()> {
        let lines_open = (line_number + 1).saturating_sub(token.line_number);
        if ledger.len() > lines_open {
            return Err(self.invariant(
                line_number,
                format!(
                    "{} ledger has {} entries for {lines_open} line(s)",
                    token.kind.name(),
                    ledger.len()
                ),
            ));
        }
        if ledger.leading_text_index > ledger.len() {
            return Err(self.invariant(line_number, "ledger cursor is past its entries"));
        }
        if ledger.tabbed.keys().any(|index| *index >= ledger.len()) {
            return Err(self.invariant(line_number, "tabbed prefix without a ledger entry"));
        }
        Ok(())
    }

    /// Check that the stack and document still agree with each other.
    pub fn verify_consistency(&self, line_number: usize) -> Result<()> {
        if !matches!(self.stack.first(), Some(StackToken::Document)) {
            return Err(self.invariant(line_number, "stack must start with the document"));
        }
        if self.stack.iter().skip(1).any(|token| matches!(token, StackToken::Document)) {
            return Err(self.invariant(line_number, "document may only be the stack root"));
        }
        for entry in self.stack.iter().skip(1) {
            if let Some(pending) = entry.pending() {
                if let Some(buffered) = pending
                    .lines
                    .iter()
                    .find(|buffered| !buffered.line.text.ends_with(&buffered.continuation))
                {
                    return Err(self.invariant(
                        line_number,
                        format!(
                            "buffered line {} does not end with {:?}",
                            buffered.line.line_number, buffered.continuation
                        ),
                    ));
                }
                continue;
            }
            let Some(id) = entry.matching_markdown_token() else {
                return Err(self.invariant(line_number, "stack token without matching token"));
            };
            let Some(token) = self.token(id) else {
                return Err(self.invariant(
                    line_number,
                    format!("matching token {} is past the end of the document", id.0),
                ));
            };
            if token.kind.name() != entry.name() {
                return Err(self.invariant(
                    line_number,
                    format!(
                        "stack token {} matches a {} token",
                        entry.name(),
                        token.kind.name()
                    ),
                ));
            }
            if self.document[id.0 + 1..].iter().any(|later| {
                matches!(later.kind, TokenKind::End { start, .. } if start == id)
            }) {
                return Err(self.invariant(
                    line_number,
                    format!("open {} token {} was already closed", entry.name(), id.0),
                ));
            }
            if let Some(ledger) = token.kind.leading_spaces() {
                self.verify_ledger(line_number, token, ledger)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{BufferedLine, PendingConstruct};

    fn block_quote(state: &mut ParserState) -> TokenId {
        let id = state.push_token(MarkdownToken::new(
            TokenKind::BlockQuote {
                extracted_whitespace: String::new(),
                leading_spaces: LeadingSpaces::default(),
            },
            1,
            1,
        ));
        state.stack.push(StackToken::BlockQuote { token: id });
        id
    }

    fn paragraph(state: &mut ParserState) -> TokenId {
        let id = state.push_token(MarkdownToken::new(
            TokenKind::Paragraph {
                extracted_whitespace: String::new(),
                final_whitespace: String::new(),
            },
            1,
            3,
        ));
        state.stack.push(StackToken::Paragraph { token: id });
        id
    }

    #[test]
    fn close_emits_one_end_per_entry() {
        let mut state = ParserState::new();
        let quote = block_quote(&mut state);
        let para = paragraph(&mut state);
        state.close_stack_to(1, true).unwrap();

        assert_eq!(state.stack.len(), 1);
        let ends: Vec<String> = state.document[2..].iter().map(|t| t.to_string()).collect();
        assert_eq!(ends, vec!["[end-para:::true]", "[end-block-quote:::true]"]);
        assert!(matches!(state.document[2].kind, TokenKind::End { start, .. } if start == para));
        assert!(matches!(state.document[3].kind, TokenKind::End { start, .. } if start == quote));
    }

    #[test]
    fn rollback_restores_stack_document_and_ledgers() {
        let mut state = ParserState::new();
        let quote = block_quote(&mut state);
        state
            .record_leading_spaces(quote, "> ".to_string(), "> ", 1)
            .unwrap();
        let checkpoint = state.checkpoint();

        state
            .record_leading_spaces(quote, ">   ".to_string(), ">\t", 2)
            .unwrap();
        paragraph(&mut state);
        state.rollback(&checkpoint);

        assert_eq!(state.stack.len(), 2);
        assert_eq!(state.document.len(), 1);
        let ledger = state.ledger(quote).unwrap();
        assert_eq!(ledger.entries, vec!["> ".to_string()]);
        assert!(ledger.tabbed.is_empty());
    }

    #[test]
    fn closing_a_pending_construct_is_an_error() {
        let mut state = ParserState::new();
        state
            .stack
            .push(StackToken::TablePending(Box::new(PendingConstruct::new(1))));
        let err = state.close_stack_to(1, true).unwrap_err();
        assert_eq!(
            err,
            TokenizerError::PendingNotFinalized {
                construct: "table-pending"
            }
        );
        assert_eq!(state.stack.len(), 2);
    }

    #[test]
    fn consistency_check_catches_closed_open_token() {
        let mut state = ParserState::new();
        let quote = block_quote(&mut state);
        assert!(state.verify_consistency(1).is_ok());
        state.push_token(MarkdownToken::end(quote, "block-quote", String::new(), None, false));
        assert!(state.verify_consistency(1).is_err());
    }

    #[test]
    fn consistency_check_catches_ledger_overrun() {
        let mut state = ParserState::new();
        let quote = block_quote(&mut state);
        state
            .record_leading_spaces(quote, "> ".to_string(), "> ", 1)
            .unwrap();
        assert!(state.verify_consistency(1).is_ok());
        state
            .record_leading_spaces(quote, "> ".to_string(), "> ", 1)
            .unwrap();
        assert!(state.verify_consistency(1).is_err());
        assert!(state.verify_consistency(2).is_ok());
    }

    #[test]
    fn consistency_check_catches_buffered_line_mismatch() {
        let mut state = ParserState::new();
        let mut pending = PendingConstruct::new(1);
        pending.lines.push(BufferedLine {
            line: QueuedLine::new(1, "> [foo]:".to_string()),
            continuation: "[foo]:".to_string(),
            column: 2,
            checkpoint: state.checkpoint(),
        });
        state
            .stack
            .push(StackToken::LinkDefinitionPending(Box::new(pending.clone())));
        assert!(state.verify_consistency(1).is_ok());

        state.stack.pop();
        pending.lines[0].continuation = "[bar]:".to_string();
        state
            .stack
            .push(StackToken::LinkDefinitionPending(Box::new(pending)));
        assert!(state.verify_consistency(1).is_err());
    }

    #[test]
    fn stack_shape_names_lists_with_indent() {
        let state = ParserState::new();
        assert_eq!(state.stack_shape(), "[document]");
    }
}
