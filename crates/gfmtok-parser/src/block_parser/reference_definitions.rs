//! Link reference definition parsing.
//!
//! Link reference definitions have the form:
//! ```markdown
//! [label]: url "optional title"
//! [label]: <url> 'optional title'
//! [label]:
//!   url
//!   (title on its own line)
//! ```
//!
//! A definition can span several lines, so the scanner works on the joined
//! text of every line buffered so far and reports whether more lines could
//! still change the answer.

use std::collections::HashMap;

use unicase::UniCase;

use super::utils::split_leading_whitespace;
use crate::parser_state::ParserState;
use crate::tokens::{MarkdownToken, TokenKind};

const MAX_LABEL_LEN: usize = 999;
const MAX_PAREN_DEPTH: usize = 32;

/// A link reference definition that maps a label to a URL and optional title.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LinkDefinition {
    pub label: String,
    pub destination: String,
    pub title: Option<String>,
}

/// Every definition in a document, keyed by normalized label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct LinkDefinitions {
    definitions: HashMap<String, LinkDefinition>,
}

impl LinkDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. The first definition of a label wins; returns false
    /// when the label was already defined.
    pub fn add(&mut self, label: String, destination: String, title: Option<String>) -> bool {
        let normalized = normalize_label(&label);
        if self.definitions.contains_key(&normalized) {
            log::debug!("duplicate link definition [{normalized}] ignored");
            return false;
        }
        self.definitions.insert(
            normalized,
            LinkDefinition {
                label,
                destination,
                title,
            },
        );
        true
    }

    /// Look up a definition by label (case-insensitive).
    pub fn get(&self, label: &str) -> Option<&LinkDefinition> {
        self.definitions.get(&normalize_label(label))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.definitions.contains_key(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Characters in a byte run, counting lead bytes only.
fn label_chars(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| (b as i8) >= -0x40).count()
}

/// Case-fold a label and collapse its internal whitespace.
///
/// Folding is the full Unicode case fold, so `ẞ` and `SS` normalize alike.
pub fn normalize_label(label: &str) -> String {
    let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
    UniCase::new(collapsed).to_folded_case()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedDefinition {
    pub label: String,
    pub destination: String,
    pub title: Option<String>,
    /// Indentation before the opening bracket.
    pub whitespace: String,
    /// Number of buffered lines the definition covers.
    pub lines_used: usize,
}

/// Outcome of scanning the buffered lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DefinitionScan {
    /// Longest complete definition found at the start of the text.
    pub best: Option<ParsedDefinition>,
    /// More lines could extend or complete the definition.
    pub can_grow: bool,
}

impl DefinitionScan {
    fn invalid() -> Self {
        Self::default()
    }

    fn growing(best: Option<ParsedDefinition>) -> Self {
        Self {
            best,
            can_grow: true,
        }
    }

    fn done(best: ParsedDefinition) -> Self {
        Self {
            best: Some(best),
            can_grow: false,
        }
    }
}

enum TitleScan {
    Complete { title: String, end: usize },
    Unterminated,
    Invalid,
}

fn skip_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while matches!(bytes.get(pos), Some(b' ' | b'\t')) {
        pos += 1;
    }
    pos
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count()
}

fn is_escapable(byte: Option<&u8>) -> bool {
    byte.is_some_and(u8::is_ascii_punctuation)
}

/// Scan a link destination starting at `start`. Returns the destination
/// (without angle brackets) and the offset after it.
fn parse_destination(text: &str, start: usize) -> Option<(String, usize)> {
    let bytes = text.as_bytes();

    if bytes.get(start) == Some(&b'<') {
        let mut pos = start + 1;
        loop {
            match bytes.get(pos)? {
                b'\\' => {
                    pos += 1;
                    if is_escapable(bytes.get(pos)) {
                        pos += 1;
                    }
                }
                b'>' => return Some((text[start + 1..pos].to_string(), pos + 1)),
                b'<' | b'\n' => return None,
                _ => pos += 1,
            }
        }
    }

    let mut pos = start;
    let mut depth = 0usize;
    while let Some(&byte) = bytes.get(pos) {
        match byte {
            b'\\' if is_escapable(bytes.get(pos + 1)) => pos += 2,
            b'(' => {
                depth += 1;
                if depth > MAX_PAREN_DEPTH {
                    return None;
                }
                pos += 1;
            }
            b')' if depth == 0 => break,
            b')' => {
                depth -= 1;
                pos += 1;
            }
            byte if byte <= b' ' || byte == 0x7f => break,
            _ => pos += 1,
        }
    }

    if pos == start || depth != 0 {
        return None;
    }
    Some((text[start..pos].to_string(), pos))
}

fn parse_title(text: &str, start: usize) -> TitleScan {
    let bytes = text.as_bytes();
    let closer = match bytes.get(start) {
        Some(b'"') => b'"',
        Some(b'\'') => b'\'',
        Some(b'(') => b')',
        _ => return TitleScan::Invalid,
    };

    let mut pos = start + 1;
    loop {
        match bytes.get(pos) {
            None => return TitleScan::Unterminated,
            Some(b'\\') => {
                pos += 1;
                if is_escapable(bytes.get(pos)) {
                    pos += 1;
                }
            }
            Some(&byte) if byte == closer => {
                return TitleScan::Complete {
                    title: text[start + 1..pos].to_string(),
                    end: pos + 1,
                };
            }
            Some(b'(') if closer == b')' => return TitleScan::Invalid,
            Some(_) => pos += 1,
        }
    }
}

/// Nothing but spaces or tabs up to the end of the line at `pos`.
fn ends_line(bytes: &[u8], pos: usize) -> bool {
    let pos = skip_spaces(bytes, pos);
    pos == bytes.len() || bytes[pos] == b'\n'
}

/// Try to parse a link reference definition at the start of `text`, which
/// holds one or more buffered lines joined with `\n`.
pub(crate) fn scan_link_reference_definition(text: &str) -> DefinitionScan {
    let bytes = text.as_bytes();
    let (whitespace, _) = split_leading_whitespace(text);
    let mut pos = whitespace.len();

    if bytes.get(pos) != Some(&b'[') {
        return DefinitionScan::invalid();
    }
    pos += 1;

    let label_start = pos;
    loop {
        match bytes.get(pos) {
            None => return DefinitionScan::growing(None),
            Some(b'\\') => {
                pos += 1;
                if is_escapable(bytes.get(pos)) {
                    pos += 1;
                }
            }
            Some(b'[') => return DefinitionScan::invalid(),
            Some(b']') => break,
            Some(_) => pos += 1,
        }
        if label_chars(&bytes[label_start..pos]) > MAX_LABEL_LEN {
            return DefinitionScan::invalid();
        }
    }
    let label = &text[label_start..pos];
    if label.trim().is_empty() {
        return DefinitionScan::invalid();
    }
    pos += 1;

    if bytes.get(pos) != Some(&b':') {
        return DefinitionScan::invalid();
    }
    pos = skip_spaces(bytes, pos + 1);
    if pos == bytes.len() {
        return DefinitionScan::growing(None);
    }
    if bytes[pos] == b'\n' {
        pos = skip_spaces(bytes, pos + 1);
        if pos == bytes.len() {
            return DefinitionScan::growing(None);
        }
    }

    let Some((destination, after_destination)) = parse_destination(text, pos) else {
        return DefinitionScan::invalid();
    };

    let definition = |title: Option<String>, last_offset: usize| ParsedDefinition {
        label: label.to_string(),
        destination: destination.clone(),
        title,
        whitespace: whitespace.to_string(),
        lines_used: line_of(text, last_offset) + 1,
    };
    let untitled = definition(None, after_destination);

    let after_ws = skip_spaces(bytes, after_destination);
    if after_ws == bytes.len() {
        return DefinitionScan::growing(Some(untitled));
    }

    if bytes[after_ws] == b'\n' {
        // A title on the following line is optional: if it does not parse,
        // the definition ends with the destination line.
        let title_start = skip_spaces(bytes, after_ws + 1);
        if title_start == bytes.len() {
            return DefinitionScan::growing(Some(untitled));
        }
        return match parse_title(text, title_start) {
            TitleScan::Complete { title, end } if ends_line(bytes, end) => {
                DefinitionScan::done(definition(Some(title), end))
            }
            TitleScan::Unterminated => DefinitionScan::growing(Some(untitled)),
            _ => DefinitionScan::done(untitled),
        };
    }

    if after_ws == after_destination {
        return DefinitionScan::invalid();
    }
    match parse_title(text, after_ws) {
        TitleScan::Complete { title, end } if ends_line(bytes, end) => {
            DefinitionScan::done(definition(Some(title), end))
        }
        TitleScan::Unterminated => DefinitionScan::growing(None),
        _ => DefinitionScan::invalid(),
    }
}

/// Register a confirmed definition and emit its token.
pub(crate) fn emit_link_reference_definition(
    state: &mut ParserState,
    definitions: &mut LinkDefinitions,
    parsed: ParsedDefinition,
    line_number: usize,
    column_number: usize,
) {
    let link_name = normalize_label(&parsed.label);
    let did_add_definition = definitions.add(
        parsed.label.clone(),
        parsed.destination.clone(),
        parsed.title.clone(),
    );
    log::debug!(
        "line {line_number}: link definition [{link_name}] over {} line(s), added={did_add_definition}",
        parsed.lines_used
    );
    state.push_token(MarkdownToken::new(
        TokenKind::LinkReferenceDefinition {
            did_add_definition,
            extracted_whitespace: parsed.whitespace,
            link_name,
            link_label: parsed.label,
            link_destination: parsed.destination,
            link_title: parsed.title,
        },
        line_number,
        column_number,
    ));
}
