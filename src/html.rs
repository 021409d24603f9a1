//! GFM HTML for the block structure of a tokenized document.
//!
//! Inline content is not parsed: text payloads are escaped and written as
//! they are.

use std::borrow::Cow;

use gfmtok_parser::{Alignment, MarkdownToken, TokenKind};

/// A block that has been opened in the output and waits for its `End`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenBlock {
    Paragraph { tight: bool },
    Heading(usize),
    Code,
    Html,
    BlockQuote,
    List { ordered: bool, tight: bool },
    Table,
    TableHeader,
    TableBody,
    TableRow,
    Cell { header: bool },
}

fn escape_text(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// Index of the `End` token of every start token that has one.
fn end_indices(tokens: &[MarkdownToken]) -> Vec<Option<usize>> {
    let mut ends = vec![None; tokens.len()];
    for (index, token) in tokens.iter().enumerate() {
        if let TokenKind::End { start, .. } = &token.kind
            && let Some(slot) = ends.get_mut(start.0)
        {
            *slot = Some(index);
        }
    }
    ends
}

/// A list is loose when a blank line separates two of its children or two
/// of its items. A nested list that ends with a blank line counts as well,
/// but other containers never end with one.
fn is_loose(tokens: &[MarkdownToken], ends: &[Option<usize>], list: usize) -> bool {
    let Some(end) = ends[list] else {
        return false;
    };
    let mut depth = 0usize;
    let mut saw_blank = false;
    let mut item_line = tokens[list].line_number;
    for index in list + 1..end {
        let token = &tokens[index];
        match &token.kind {
            TokenKind::End { start, .. } => {
                depth = depth.saturating_sub(1);
                let closes_list = tokens
                    .get(start.0)
                    .is_some_and(|start| start.kind.is_list_start());
                if depth == 0 && closes_list && tokens[index - 1].is_blank() {
                    saw_blank = true;
                }
            }
            // The marker line of an empty item is not a separating blank.
            TokenKind::BlankLine { .. } if depth == 0 && token.line_number != item_line => {
                saw_blank = true;
            }
            TokenKind::BlankLine { .. } => {}
            _ => {
                if depth == 0 && saw_blank {
                    return true;
                }
                if depth == 0 && matches!(token.kind, TokenKind::NewListItem { .. }) {
                    item_line = token.line_number;
                }
                if ends[index].is_some() {
                    depth += 1;
                }
            }
        }
    }
    false
}

fn alignment_attribute(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::None => "",
        Alignment::Left => " align=\"left\"",
        Alignment::Center => " align=\"center\"",
        Alignment::Right => " align=\"right\"",
    }
}

struct HtmlRenderer<'a> {
    tokens: &'a [MarkdownToken],
    ends: Vec<Option<usize>>,
    open: Vec<OpenBlock>,
    output: String,
}

impl<'a> HtmlRenderer<'a> {
    fn new(tokens: &'a [MarkdownToken]) -> Self {
        Self {
            tokens,
            ends: end_indices(tokens),
            open: Vec::new(),
            output: String::new(),
        }
    }

    /// Start a new output line unless already at one.
    fn cr(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
    }

    fn in_tight_list(&self) -> bool {
        matches!(self.open.last(), Some(OpenBlock::List { tight: true, .. }))
    }

    fn render(mut self) -> String {
        let tokens = self.tokens;
        for (index, token) in tokens.iter().enumerate() {
            self.render_token(index, token);
        }
        self.output
    }

    fn render_token(&mut self, index: usize, token: &MarkdownToken) {
        match &token.kind {
            TokenKind::Paragraph { .. } => {
                let tight = self.in_tight_list();
                if !tight {
                    self.cr();
                    self.output.push_str("<p>");
                }
                self.open.push(OpenBlock::Paragraph { tight });
            }
            TokenKind::AtxHeading { hash_count, .. } => self.open_heading(*hash_count),
            TokenKind::SetextHeading {
                heading_character, ..
            } => self.open_heading(if *heading_character == '=' { 1 } else { 2 }),
            TokenKind::ThematicBreak { .. } => {
                self.cr();
                self.output.push_str("<hr />\n");
            }
            TokenKind::FencedCodeBlock { info_string, .. } => {
                self.cr();
                match info_string.split_whitespace().next() {
                    Some(language) => {
                        self.output.push_str("<pre><code class=\"language-");
                        self.output.push_str(&escape_text(language));
                        self.output.push_str("\">");
                    }
                    None => self.output.push_str("<pre><code>"),
                }
                self.open.push(OpenBlock::Code);
            }
            TokenKind::IndentedCodeBlock { .. } => {
                self.cr();
                self.output.push_str("<pre><code>");
                self.open.push(OpenBlock::Code);
            }
            TokenKind::HtmlBlock => {
                self.cr();
                self.open.push(OpenBlock::Html);
            }
            TokenKind::BlockQuote { .. } => {
                self.cr();
                self.output.push_str("<blockquote>\n");
                self.open.push(OpenBlock::BlockQuote);
            }
            TokenKind::UnorderedListStart { .. } => {
                self.cr();
                self.output.push_str("<ul>\n<li>");
                let tight = !is_loose(self.tokens, &self.ends, index);
                self.open.push(OpenBlock::List {
                    ordered: false,
                    tight,
                });
            }
            TokenKind::OrderedListStart { start_number, .. } => {
                self.cr();
                match start_number.parse::<u64>() {
                    Ok(1) | Err(_) => self.output.push_str("<ol>\n<li>"),
                    Ok(start) => {
                        self.output.push_str(&format!("<ol start=\"{start}\">\n<li>"));
                    }
                }
                let tight = !is_loose(self.tokens, &self.ends, index);
                self.open.push(OpenBlock::List {
                    ordered: true,
                    tight,
                });
            }
            TokenKind::NewListItem { .. } => self.output.push_str("</li>\n<li>"),
            TokenKind::Table => {
                self.cr();
                self.output.push_str("<table>\n");
                self.open.push(OpenBlock::Table);
            }
            TokenKind::TableHeader => {
                self.output.push_str("<thead>\n<tr>\n");
                self.open.push(OpenBlock::TableHeader);
            }
            TokenKind::TableBody => {
                self.output.push_str("<tbody>\n");
                self.open.push(OpenBlock::TableBody);
            }
            TokenKind::TableRow => {
                self.output.push_str("<tr>\n");
                self.open.push(OpenBlock::TableRow);
            }
            TokenKind::TableHeaderItem { alignment } => self.open_cell(true, *alignment),
            TokenKind::TableRowItem { alignment } => self.open_cell(false, *alignment),
            TokenKind::Text { text, .. } => self.render_text(text),
            TokenKind::End { .. } => self.close_block(),
            TokenKind::BlankLine { .. }
            | TokenKind::LinkReferenceDefinition { .. }
            | TokenKind::FrontMatter { .. } => {}
        }
    }

    fn open_heading(&mut self, level: usize) {
        self.cr();
        self.output.push_str(&format!("<h{level}>"));
        self.open.push(OpenBlock::Heading(level));
    }

    fn open_cell(&mut self, header: bool, alignment: Alignment) {
        let tag = if header { "th" } else { "td" };
        self.output
            .push_str(&format!("<{tag}{}>", alignment_attribute(alignment)));
        self.open.push(OpenBlock::Cell { header });
    }

    fn render_text(&mut self, text: &str) {
        match self.open.last() {
            Some(OpenBlock::Paragraph { .. } | OpenBlock::Heading(_) | OpenBlock::Cell { .. }) => {
                self.output.push_str(&escape_text(text));
            }
            Some(OpenBlock::Code) => {
                self.output.push_str(&escape_text(text));
                self.output.push('\n');
            }
            Some(OpenBlock::Html) => {
                self.output.push_str(text);
                self.output.push('\n');
            }
            _ => log::debug!("text outside a leaf block: {text:?}"),
        }
    }

    fn close_block(&mut self) {
        let Some(block) = self.open.pop() else {
            log::warn!("end token without an open block");
            return;
        };
        match block {
            OpenBlock::Paragraph { tight: true } => {}
            OpenBlock::Paragraph { tight: false } => self.output.push_str("</p>\n"),
            OpenBlock::Heading(level) => self.output.push_str(&format!("</h{level}>\n")),
            OpenBlock::Code => self.output.push_str("</code></pre>\n"),
            OpenBlock::Html => {}
            OpenBlock::BlockQuote => {
                self.cr();
                self.output.push_str("</blockquote>\n");
            }
            OpenBlock::List { ordered, .. } => {
                self.output
                    .push_str(if ordered { "</li>\n</ol>\n" } else { "</li>\n</ul>\n" });
            }
            OpenBlock::Table => self.output.push_str("</table>\n"),
            OpenBlock::TableHeader => self.output.push_str("</tr>\n</thead>\n"),
            OpenBlock::TableBody => self.output.push_str("</tbody>\n"),
            OpenBlock::TableRow => self.output.push_str("</tr>\n"),
            OpenBlock::Cell { header } => {
                self.output
                    .push_str(if header { "</th>\n" } else { "</td>\n" });
            }
        }
    }
}

/// Render tokens produced by the tokenizer as GFM HTML.
pub fn transform_to_gfm(tokens: &[MarkdownToken]) -> String {
    HtmlRenderer::new(tokens).render()
}
