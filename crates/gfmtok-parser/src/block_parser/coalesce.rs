//! Post-pass joining the per-line `Text` tokens of each leaf block.

use super::indented_code::CODE_INDENT;
use super::utils::split_trailing_whitespace;
use crate::error::{Result, TokenizerError};
use crate::tabs::{detabified_width, split_tab_at_boundary};
use crate::tokens::{BLANK_LINE_PLACEHOLDER, MarkdownToken, TokenId, TokenKind};

/// The leaf block whose lines are being joined.
#[derive(Debug, Clone, Copy)]
struct OpenLeaf {
    /// Index of the leaf's start token in the input document.
    start: TokenId,
    /// Index of the leaf's start token in the output.
    output_start: usize,
    /// Index of the leaf's merged `Text` token in the output.
    text: Option<usize>,
    /// Columns of a blank line's whitespace that belong to the block
    /// structure rather than the content. `None` when blank lines cannot
    /// occur inside the leaf.
    blank_budget: Option<usize>,
    trims_final_whitespace: bool,
}

fn open_leaf(kind: &TokenKind, start: TokenId, output_start: usize) -> Option<OpenLeaf> {
    let (blank_budget, trims_final_whitespace) = match kind {
        TokenKind::Paragraph { .. } | TokenKind::SetextHeading { .. } => (None, true),
        TokenKind::FencedCodeBlock {
            extracted_whitespace,
            ..
        } => (Some(detabified_width(extracted_whitespace, 0)), false),
        TokenKind::IndentedCodeBlock { .. } => (Some(CODE_INDENT), false),
        TokenKind::HtmlBlock => (Some(0), false),
        _ => return None,
    };
    Some(OpenLeaf {
        start,
        output_start,
        text: None,
        blank_budget,
        trims_final_whitespace,
    })
}

/// Turn a blank line inside a code or HTML block into a content line.
///
/// Returns the whitespace owned by the block, marked with the placeholder,
/// and the whitespace that is content.
fn split_blank_line(whitespace: &str, column_number: usize, budget: usize) -> (String, String) {
    let start_column = column_number.saturating_sub(1);
    let boundary = split_tab_at_boundary(whitespace, start_column, budget);
    let mut removed = String::from(BLANK_LINE_PLACEHOLDER);
    removed.push_str(&whitespace[..boundary.literal_len]);
    let content = match boundary.split {
        Some(split) => {
            let mut content: String = " ".repeat(split.leftover_columns);
            content.push_str(&whitespace[split.tab_index + 1..]);
            content
        }
        None => whitespace[boundary.literal_len..].to_string(),
    };
    (removed, content)
}

fn append_line(target: &mut MarkdownToken, text: &str, whitespace: &str) {
    if let TokenKind::Text {
        text: joined,
        end_whitespace,
        ..
    } = &mut target.kind
    {
        joined.push('\n');
        joined.push_str(text);
        end_whitespace.push('\n');
        end_whitespace.push_str(whitespace);
    }
}

fn close_leaf(output: &mut [MarkdownToken], leaf: &OpenLeaf) {
    if !leaf.trims_final_whitespace {
        return;
    }
    let Some(text_index) = leaf.text else {
        return;
    };
    let trailing = match &mut output[text_index].kind {
        TokenKind::Text { text, .. } => {
            let (content, trailing) = split_trailing_whitespace(text);
            let (content_len, trailing) = (content.len(), trailing.to_string());
            text.truncate(content_len);
            trailing
        }
        _ => return,
    };
    if let TokenKind::Paragraph {
        final_whitespace, ..
    }
    | TokenKind::SetextHeading {
        final_whitespace, ..
    } = &mut output[leaf.output_start].kind
    {
        *final_whitespace = trailing;
    }
}

/// Join the `Text` tokens of every leaf block into one token per block.
///
/// Later lines' leading whitespace moves to the merged token's
/// `end_whitespace`, one newline-prefixed entry per line. The last line's
/// trailing whitespace of a paragraph or setext heading moves to the start
/// token's `final_whitespace`. Blank lines inside code and HTML blocks
/// become content lines whose block-owned whitespace is marked with
/// `BLANK_LINE_PLACEHOLDER`.
pub(crate) fn coalesce_text_tokens(document: Vec<MarkdownToken>) -> Result<Vec<MarkdownToken>> {
    let mut output: Vec<MarkdownToken> = Vec::with_capacity(document.len());
    let mut remap: Vec<usize> = Vec::with_capacity(document.len());
    let mut leaf: Option<OpenLeaf> = None;

    for (index, mut token) in document.into_iter().enumerate() {
        let id = TokenId(index);

        if let TokenKind::End { start, .. } = &mut token.kind {
            let Some(&mapped) = remap.get(start.0) else {
                return Err(TokenizerError::BadTokenization {
                    line_number: 0,
                    reason: format!("end token {index} closes later token {}", start.0),
                    stack: String::new(),
                });
            };
            if let Some(open) = leaf.filter(|open| open.start == *start) {
                close_leaf(&mut output, &open);
                leaf = None;
            }
            *start = TokenId(mapped);
        }

        if let Some(budget) = leaf.and_then(|open| open.blank_budget)
            && let TokenKind::BlankLine {
                extracted_whitespace,
            } = &token.kind
        {
            let (removed, content) =
                split_blank_line(extracted_whitespace, token.column_number, budget);
            token = MarkdownToken::new(
                TokenKind::Text {
                    text: content,
                    extracted_whitespace: removed,
                    end_whitespace: String::new(),
                },
                token.line_number,
                token.column_number,
            );
        }

        let merged_into = match (&mut leaf, &token.kind) {
            (
                Some(open),
                TokenKind::Text {
                    text,
                    extracted_whitespace,
                    ..
                },
            ) => match open.text {
                Some(text_index) => {
                    append_line(&mut output[text_index], text, extracted_whitespace);
                    Some(text_index)
                }
                None => {
                    open.text = Some(output.len());
                    None
                }
            },
            _ => None,
        };

        if let Some(text_index) = merged_into {
            remap.push(text_index);
            continue;
        }

        if leaf.is_none()
            && let Some(open) = open_leaf(&token.kind, id, output.len())
        {
            leaf = Some(open);
        }
        remap.push(output.len());
        output.push(token);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(text: &str, ws: &str, line: usize) -> MarkdownToken {
        MarkdownToken::new(
            TokenKind::Text {
                text: text.to_string(),
                extracted_whitespace: ws.to_string(),
                end_whitespace: String::new(),
            },
            line,
            1,
        )
    }

    fn dump(tokens: &[MarkdownToken]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn paragraph_lines_join_and_keep_whitespace() {
        let document = vec![
            MarkdownToken::new(
                TokenKind::Paragraph {
                    extracted_whitespace: String::new(),
                    final_whitespace: String::new(),
                },
                1,
                1,
            ),
            text("abc", "", 1),
            text("def  ", "  ", 2),
            MarkdownToken::end(TokenId(0), "para", String::new(), None, false),
        ];
        let tokens = coalesce_text_tokens(document).unwrap();
        assert_eq!(tokens.len(), 3);
        let TokenKind::Text {
            text,
            end_whitespace,
            ..
        } = &tokens[1].kind
        else {
            panic!("expected text, got {}", tokens[1]);
        };
        assert_eq!(text, "abc\ndef");
        assert_eq!(end_whitespace, "\n  ");
        assert!(matches!(
            &tokens[0].kind,
            TokenKind::Paragraph { final_whitespace, .. } if final_whitespace == "  "
        ));
        assert!(matches!(tokens[2].kind, TokenKind::End { start: TokenId(0), .. }));
    }

    #[test]
    fn blank_line_in_indented_code_becomes_content() {
        let document = vec![
            MarkdownToken::new(
                TokenKind::IndentedCodeBlock {
                    extracted_whitespace: "    ".to_string(),
                },
                1,
                5,
            ),
            text("a", "", 1),
            MarkdownToken::new(
                TokenKind::BlankLine {
                    extracted_whitespace: "      ".to_string(),
                },
                2,
                1,
            ),
            text("b", "    ", 3),
            MarkdownToken::end(TokenId(0), "icode-block", String::new(), None, true),
        ];
        let tokens = coalesce_text_tokens(document).unwrap();
        similar_asserts::assert_eq!(
            dump(&tokens),
            vec![
                "[icode-block(1,5):    ]".to_string(),
                "[text(1,1):a\\n  \\nb::\\n\\x03    \\n    ]".to_string(),
                "[end-icode-block:::true]".to_string(),
            ]
        );
    }

    #[test]
    fn blank_outside_leaves_is_kept() {
        let document = vec![MarkdownToken::new(
            TokenKind::BlankLine {
                extracted_whitespace: String::new(),
            },
            1,
            1,
        )];
        let tokens = coalesce_text_tokens(document.clone()).unwrap();
        assert_eq!(tokens, document);
    }

    #[test]
    fn end_before_start_is_an_error() {
        let document = vec![MarkdownToken::end(TokenId(3), "para", String::new(), None, true)];
        assert!(coalesce_text_tokens(document).is_err());
    }
}
