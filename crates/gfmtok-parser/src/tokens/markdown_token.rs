//! Output tokens.
//!
//! The token document is an arena: tokens are appended in source order and
//! referenced by their index. Container start tokens own a leading-spaces
//! ledger with one entry per physical line they were open for.

use std::collections::BTreeMap;
use std::fmt;

/// Marks a line of code block content that came from a blank line.
pub const BLANK_LINE_PLACEHOLDER: char = '\u{3}';

/// Index of a token in the token document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct TokenId(pub usize);

/// Per-line record of the prefix a container consumed.
///
/// `entries` holds the detabified prefix for every line. When the literal
/// prefix contained a tab, the untouched text is kept in `tabbed` under the
/// same line index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LeadingSpaces {
    pub entries: Vec<String>,
    pub tabbed: BTreeMap<usize, String>,
    pub leading_text_index: usize,
}

impl LeadingSpaces {
    pub fn push(&mut self, detabified: String, literal: &str) {
        if detabified != literal {
            self.tabbed.insert(self.entries.len(), literal.to_string());
        }
        self.entries.push(detabified);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries recorded after a checkpoint.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
        self.tabbed.retain(|index, _| *index < len);
        self.leading_text_index = self.leading_text_index.min(len);
    }

    /// Literal prefix consumed on the ledger's `index`-th line.
    pub fn literal(&self, index: usize) -> Option<&str> {
        self.tabbed
            .get(&index)
            .map(String::as_str)
            .or_else(|| self.entries.get(index).map(String::as_str))
    }

    /// Replay the ledger in order.
    pub fn next_entry(&mut self) -> Option<&str> {
        let entry = self.entries.get(self.leading_text_index)?;
        self.leading_text_index += 1;
        Some(entry.as_str())
    }

    pub fn reset_replay(&mut self) {
        self.leading_text_index = 0;
    }
}

/// Alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "kebab-case"))]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::None => "",
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type", rename_all = "kebab-case"))]
pub enum TokenKind {
    BlankLine {
        extracted_whitespace: String,
    },
    Paragraph {
        extracted_whitespace: String,
        final_whitespace: String,
    },
    /// Leaf content. `end_whitespace` is filled by the coalesce pass with the
    /// leading whitespace of every line after the first, each prefixed by a
    /// newline.
    Text {
        text: String,
        extracted_whitespace: String,
        end_whitespace: String,
    },
    AtxHeading {
        hash_count: usize,
        remove_trailing_count: usize,
        extracted_whitespace: String,
    },
    SetextHeading {
        heading_character: char,
        heading_character_count: usize,
        extracted_whitespace: String,
        final_whitespace: String,
    },
    ThematicBreak {
        start_character: char,
        extracted_whitespace: String,
        rest_of_line: String,
    },
    FencedCodeBlock {
        fence_character: char,
        fence_count: usize,
        info_string: String,
        whitespace_before_info: String,
        extracted_whitespace: String,
    },
    IndentedCodeBlock {
        extracted_whitespace: String,
    },
    HtmlBlock,
    LinkReferenceDefinition {
        did_add_definition: bool,
        extracted_whitespace: String,
        link_name: String,
        link_label: String,
        link_destination: String,
        link_title: Option<String>,
    },
    BlockQuote {
        extracted_whitespace: String,
        leading_spaces: LeadingSpaces,
    },
    UnorderedListStart {
        list_character: char,
        indent_level: usize,
        extracted_whitespace: String,
        leading_spaces: LeadingSpaces,
    },
    OrderedListStart {
        delimiter: char,
        start_number: String,
        indent_level: usize,
        extracted_whitespace: String,
        leading_spaces: LeadingSpaces,
    },
    NewListItem {
        indent_level: usize,
        extracted_whitespace: String,
        list_start_content: String,
    },
    Table,
    TableHeader,
    TableHeaderItem {
        alignment: Alignment,
    },
    TableBody,
    TableRow,
    TableRowItem {
        alignment: Alignment,
    },
    FrontMatter {
        start_boundary: String,
        end_boundary: String,
        collected_lines: Vec<String>,
    },
    End {
        start: TokenId,
        name: &'static str,
        extracted_whitespace: String,
        extra_end_data: Option<String>,
        was_forced: bool,
    },
}

impl TokenKind {
    /// Short name used in the text form and in `End` tokens.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::BlankLine { .. } => "BLANK",
            TokenKind::Paragraph { .. } => "para",
            TokenKind::Text { .. } => "text",
            TokenKind::AtxHeading { .. } => "atx",
            TokenKind::SetextHeading { .. } => "setext",
            TokenKind::ThematicBreak { .. } => "tbreak",
            TokenKind::FencedCodeBlock { .. } => "fcode-block",
            TokenKind::IndentedCodeBlock { .. } => "icode-block",
            TokenKind::HtmlBlock => "html-block",
            TokenKind::LinkReferenceDefinition { .. } => "link-ref-def",
            TokenKind::BlockQuote { .. } => "block-quote",
            TokenKind::UnorderedListStart { .. } => "ulist",
            TokenKind::OrderedListStart { .. } => "olist",
            TokenKind::NewListItem { .. } => "li",
            TokenKind::Table => "table",
            TokenKind::TableHeader => "table-header",
            TokenKind::TableHeaderItem { .. } => "table-header-item",
            TokenKind::TableBody => "table-body",
            TokenKind::TableRow => "table-row",
            TokenKind::TableRowItem { .. } => "table-row-item",
            TokenKind::FrontMatter { .. } => "front-matter",
            TokenKind::End { .. } => "end",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            TokenKind::BlockQuote { .. }
                | TokenKind::UnorderedListStart { .. }
                | TokenKind::OrderedListStart { .. }
        )
    }

    pub fn is_list_start(&self) -> bool {
        matches!(
            self,
            TokenKind::UnorderedListStart { .. } | TokenKind::OrderedListStart { .. }
        )
    }

    pub fn leading_spaces(&self) -> Option<&LeadingSpaces> {
        match self {
            TokenKind::BlockQuote { leading_spaces, .. }
            | TokenKind::UnorderedListStart { leading_spaces, .. }
            | TokenKind::OrderedListStart { leading_spaces, .. } => Some(leading_spaces),
            _ => None,
        }
    }

    pub fn leading_spaces_mut(&mut self) -> Option<&mut LeadingSpaces> {
        match self {
            TokenKind::BlockQuote { leading_spaces, .. }
            | TokenKind::UnorderedListStart { leading_spaces, .. }
            | TokenKind::OrderedListStart { leading_spaces, .. } => Some(leading_spaces),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MarkdownToken {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: TokenKind,
    pub line_number: usize,
    pub column_number: usize,
}

impl MarkdownToken {
    pub fn new(kind: TokenKind, line_number: usize, column_number: usize) -> Self {
        Self {
            kind,
            line_number,
            column_number,
        }
    }

    pub fn end(
        start: TokenId,
        name: &'static str,
        extracted_whitespace: String,
        extra_end_data: Option<String>,
        was_forced: bool,
    ) -> Self {
        Self::new(
            TokenKind::End {
                start,
                name,
                extracted_whitespace,
                extra_end_data,
                was_forced,
            },
            0,
            0,
        )
    }

    pub fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::End { .. })
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.kind, TokenKind::BlankLine { .. })
    }
}

/// Make a field printable on one line.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            BLANK_LINE_PLACEHOLDER => out.push_str("\\x03"),
            other => out.push(other),
        }
    }
    out
}

fn escape_ledger(ledger: &LeadingSpaces) -> String {
    escape(&ledger.entries.join("\n"))
}

impl fmt::Display for MarkdownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind.name();
        let (l, c) = (self.line_number, self.column_number);
        match &self.kind {
            TokenKind::BlankLine {
                extracted_whitespace,
            } => write!(f, "[{name}({l},{c}):{}]", escape(extracted_whitespace)),
            TokenKind::Paragraph {
                extracted_whitespace,
                final_whitespace,
            } => {
                write!(f, "[{name}({l},{c}):{}", escape(extracted_whitespace))?;
                if !final_whitespace.is_empty() {
                    write!(f, ":{}", escape(final_whitespace))?;
                }
                f.write_str("]")
            }
            TokenKind::Text {
                text,
                extracted_whitespace,
                end_whitespace,
            } => {
                write!(
                    f,
                    "[{name}({l},{c}):{}:{}",
                    escape(text),
                    escape(extracted_whitespace)
                )?;
                if !end_whitespace.is_empty() {
                    write!(f, ":{}", escape(end_whitespace))?;
                }
                f.write_str("]")
            }
            TokenKind::AtxHeading {
                hash_count,
                remove_trailing_count,
                extracted_whitespace,
            } => write!(
                f,
                "[{name}({l},{c}):{hash_count}:{remove_trailing_count}:{}]",
                escape(extracted_whitespace)
            ),
            TokenKind::SetextHeading {
                heading_character,
                heading_character_count,
                extracted_whitespace,
                final_whitespace,
            } => {
                write!(
                    f,
                    "[{name}({l},{c}):{heading_character}:{heading_character_count}:{}",
                    escape(extracted_whitespace)
                )?;
                if !final_whitespace.is_empty() {
                    write!(f, ":{}", escape(final_whitespace))?;
                }
                f.write_str("]")
            }
            TokenKind::ThematicBreak {
                start_character,
                extracted_whitespace,
                rest_of_line,
            } => write!(
                f,
                "[{name}({l},{c}):{start_character}:{}:{}]",
                escape(extracted_whitespace),
                escape(rest_of_line)
            ),
            TokenKind::FencedCodeBlock {
                fence_character,
                fence_count,
                info_string,
                whitespace_before_info,
                extracted_whitespace,
            } => write!(
                f,
                "[{name}({l},{c}):{fence_character}:{fence_count}:{}:{}:{}]",
                escape(info_string),
                escape(whitespace_before_info),
                escape(extracted_whitespace)
            ),
            TokenKind::IndentedCodeBlock {
                extracted_whitespace,
            } => write!(f, "[{name}({l},{c}):{}]", escape(extracted_whitespace)),
            TokenKind::HtmlBlock
            | TokenKind::Table
            | TokenKind::TableHeader
            | TokenKind::TableBody
            | TokenKind::TableRow => write!(f, "[{name}({l},{c})]"),
            TokenKind::LinkReferenceDefinition {
                did_add_definition,
                extracted_whitespace,
                link_name,
                link_label,
                link_destination,
                link_title,
            } => write!(
                f,
                "[{name}({l},{c}):{did_add_definition}:{}:{}:{}:{}:{}]",
                escape(extracted_whitespace),
                escape(link_name),
                escape(link_label),
                escape(link_destination),
                escape(link_title.as_deref().unwrap_or_default())
            ),
            TokenKind::BlockQuote {
                extracted_whitespace,
                leading_spaces,
            } => write!(
                f,
                "[{name}({l},{c}):{}:{}]",
                escape(extracted_whitespace),
                escape_ledger(leading_spaces)
            ),
            TokenKind::UnorderedListStart {
                list_character,
                indent_level,
                extracted_whitespace,
                leading_spaces,
            } => write!(
                f,
                "[{name}({l},{c}):{list_character}::{indent_level}:{}:{}]",
                escape(extracted_whitespace),
                escape_ledger(leading_spaces)
            ),
            TokenKind::OrderedListStart {
                delimiter,
                start_number,
                indent_level,
                extracted_whitespace,
                leading_spaces,
            } => write!(
                f,
                "[{name}({l},{c}):{delimiter}:{start_number}:{indent_level}:{}:{}]",
                escape(extracted_whitespace),
                escape_ledger(leading_spaces)
            ),
            TokenKind::NewListItem {
                indent_level,
                extracted_whitespace,
                list_start_content,
            } => write!(
                f,
                "[{name}({l},{c}):{indent_level}:{}:{list_start_content}]",
                escape(extracted_whitespace)
            ),
            TokenKind::TableHeaderItem { alignment } | TokenKind::TableRowItem { alignment } => {
                write!(f, "[{name}({l},{c}):{}]", alignment.as_str())
            }
            TokenKind::FrontMatter {
                start_boundary,
                end_boundary,
                collected_lines,
            } => write!(
                f,
                "[{name}({l},{c}):{start_boundary}:{end_boundary}:{}]",
                escape(&collected_lines.join("\n"))
            ),
            TokenKind::End {
                name,
                extracted_whitespace,
                extra_end_data,
                was_forced,
                ..
            } => write!(
                f,
                "[end-{name}:{}:{}:{was_forced}]",
                escape(extracted_whitespace),
                escape(extra_end_data.as_deref().unwrap_or_default())
            ),
        }
    }
}
