//! GFM pipe table parsing.
//!
//! A table is a header row, a delimiter row with the same number of cells,
//! and any number of body rows. Like link reference definitions, tables are
//! only known to be tables after their second line, so the rows are buffered
//! and scanned as a group.

use super::headings::try_parse_setext_underline;
use super::utils::{is_space_or_tab, split_leading_whitespace, split_trailing_whitespace};
use crate::parser_state::ParserState;
use crate::tabs::detabified_width;
use crate::tokens::{Alignment, BufferedLine, MarkdownToken, TokenKind};

/// One cell of a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableCell {
    /// Cell content with surrounding whitespace removed and `\|` unescaped.
    pub text: String,
    /// Whitespace between the cell's opening pipe and its content.
    pub whitespace: String,
    /// Byte offset of the content within the row.
    pub offset: usize,
}

/// Byte offsets of every pipe that is not backslash-escaped.
fn unescaped_pipes(line: &str) -> Vec<usize> {
    let mut pipes = Vec::new();
    let mut escaped = false;
    for (index, byte) in line.bytes().enumerate() {
        match byte {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b'|' => pipes.push(index),
            _ => {}
        }
    }
    pipes
}

pub(crate) fn has_unescaped_pipe(line: &str) -> bool {
    !unescaped_pipes(line).is_empty()
}

/// A row that can head a table: it has a pipe and is more than a lone pipe.
pub(crate) fn is_header_row(line: &str) -> bool {
    has_unescaped_pipe(line) && line.trim_matches(is_space_or_tab) != "|"
}

fn make_cell(line: &str, start: usize, end: usize) -> TableCell {
    let segment = &line[start..end];
    let (whitespace, rest) = split_leading_whitespace(segment);
    let (content, _) = split_trailing_whitespace(rest);
    TableCell {
        text: content.replace("\\|", "|"),
        whitespace: whitespace.to_string(),
        offset: start + whitespace.len(),
    }
}

/// Split a row into cells. Leading and trailing pipes are optional; a row
/// without any pipe is a single cell.
pub(crate) fn split_table_row(line: &str) -> Vec<TableCell> {
    let (leading, body) = split_leading_whitespace(line);
    let start = leading.len();
    let content_end = start + split_trailing_whitespace(body).0.len();

    let mut separators = unescaped_pipes(line);
    let mut cell_start = start;
    if separators.first() == Some(&start) {
        separators.remove(0);
        cell_start = start + 1;
    }
    let mut row_end = content_end;
    if content_end > cell_start && separators.last() == Some(&(content_end - 1)) {
        separators.pop();
        row_end = content_end - 1;
    }

    let mut cells = Vec::with_capacity(separators.len() + 1);
    for separator in separators {
        cells.push(make_cell(line, cell_start, separator));
        cell_start = separator + 1;
    }
    cells.push(make_cell(line, cell_start, row_end.max(cell_start)));
    cells
}

/// Parse a delimiter row such as `| :--- | ---: | :-: |`.
pub(crate) fn parse_delimiter_row(line: &str) -> Option<Vec<Alignment>> {
    let (_, content) = split_leading_whitespace(line);
    // Without a pipe, a run of dashes underlines a setext heading instead.
    if !has_unescaped_pipe(line) && try_parse_setext_underline(content).is_some() {
        return None;
    }

    split_table_row(line)
        .iter()
        .map(|cell| {
            let text = cell.text.as_str();
            let left = text.starts_with(':');
            let right = text.len() > 1 && text.ends_with(':');
            let dashes = text.trim_start_matches(':').trim_end_matches(':');
            if dashes.is_empty() || !dashes.chars().all(|ch| ch == '-') {
                return None;
            }
            Some(match (left, right) {
                (true, true) => Alignment::Center,
                (true, false) => Alignment::Left,
                (false, true) => Alignment::Right,
                (false, false) => Alignment::None,
            })
        })
        .collect()
}

/// Outcome of scanning the buffered rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TableScan {
    /// Number of rows that form a valid table.
    pub rows: Option<usize>,
    pub can_grow: bool,
}

pub(crate) fn scan_table(lines: &[&str]) -> TableScan {
    match lines {
        [header] if is_header_row(header) => TableScan {
            rows: None,
            can_grow: true,
        },
        [header, delimiter, ..] if is_header_row(header) => match parse_delimiter_row(delimiter) {
            Some(alignments) if alignments.len() == split_table_row(header).len() => TableScan {
                rows: Some(lines.len()),
                can_grow: true,
            },
            _ => TableScan::default(),
        },
        _ => TableScan::default(),
    }
}

fn cell_column(line: &BufferedLine, offset: usize) -> usize {
    detabified_width(&line.continuation[..offset], line.column) + 1
}

fn content_column(line: &BufferedLine) -> usize {
    let (leading, _) = split_leading_whitespace(&line.continuation);
    detabified_width(leading, line.column) + 1
}

fn emit_row(
    state: &mut ParserState,
    line: &BufferedLine,
    alignments: &[Alignment],
    header: bool,
) {
    let line_number = line.line.line_number;
    let cells = split_table_row(&line.continuation);
    for (index, alignment) in alignments.iter().copied().enumerate() {
        let cell = cells.get(index);
        let column = cell.map_or_else(|| content_column(line), |cell| cell_column(line, cell.offset));
        let kind = if header {
            TokenKind::TableHeaderItem { alignment }
        } else {
            TokenKind::TableRowItem { alignment }
        };
        let start = state.push_token(MarkdownToken::new(kind, line_number, column));
        if let Some(cell) = cell.filter(|cell| !cell.text.is_empty()) {
            state.push_token(MarkdownToken::new(
                TokenKind::Text {
                    text: cell.text.clone(),
                    extracted_whitespace: cell.whitespace.clone(),
                    end_whitespace: String::new(),
                },
                line_number,
                column,
            ));
        }
        let name = if header { "table-header-item" } else { "table-row-item" };
        state.push_token(MarkdownToken::end(start, name, String::new(), None, false));
    }
}

/// Emit the tokens of a confirmed table made of `lines`.
pub(crate) fn emit_table(state: &mut ParserState, lines: &[BufferedLine]) {
    let [header, delimiter, body @ ..] = lines else {
        return;
    };
    let Some(alignments) = parse_delimiter_row(&delimiter.continuation) else {
        return;
    };
    log::debug!(
        "line {}: table with {} column(s) and {} body row(s)",
        header.line.line_number,
        alignments.len(),
        body.len()
    );

    let table = state.push_token(MarkdownToken::new(
        TokenKind::Table,
        header.line.line_number,
        content_column(header),
    ));

    let header_start = state.push_token(MarkdownToken::new(
        TokenKind::TableHeader,
        header.line.line_number,
        content_column(header),
    ));
    emit_row(state, header, &alignments, true);
    let (_, delimiter_text) = split_leading_whitespace(&delimiter.continuation);
    state.push_token(MarkdownToken::end(
        header_start,
        "table-header",
        String::new(),
        Some(delimiter_text.to_string()),
        false,
    ));

    if let Some(first) = body.first() {
        let body_start = state.push_token(MarkdownToken::new(
            TokenKind::TableBody,
            first.line.line_number,
            content_column(first),
        ));
        for row in body {
            let row_start = state.push_token(MarkdownToken::new(
                TokenKind::TableRow,
                row.line.line_number,
                content_column(row),
            ));
            emit_row(state, row, &alignments, false);
            state.push_token(MarkdownToken::end(row_start, "table-row", String::new(), None, false));
        }
        state.push_token(MarkdownToken::end(body_start, "table-body", String::new(), None, false));
    }

    state.push_token(MarkdownToken::end(table, "table", String::new(), None, false));
}
