//! List markers, list items and list continuation.

use crate::error::Result;
use crate::parser_state::ParserState;
use crate::position::PositionMarker;
use crate::tokens::{LeadingSpaces, ListStackData, MarkdownToken, StackToken, TokenKind};

/// Ordered list start numbers are limited to nine digits.
const MAX_ORDERED_DIGITS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListMarker {
    Bullet(char),
    Ordered { number: String, delimiter: char },
}

impl ListMarker {
    /// The bullet character or the ordered delimiter.
    pub fn list_character(&self) -> char {
        match self {
            ListMarker::Bullet(ch) => *ch,
            ListMarker::Ordered { delimiter, .. } => *delimiter,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            ListMarker::Bullet(_) => 1,
            ListMarker::Ordered { number, .. } => number.len() + 1,
        }
    }

    pub fn is_ordered(&self) -> bool {
        matches!(self, ListMarker::Ordered { .. })
    }
}

/// A list marker found on a line, with the geometry of the item it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListItemStart<'a> {
    pub marker: ListMarker,
    /// Columns of indentation before the marker.
    pub ws_before_marker: usize,
    /// Marker width plus the spaces that belong to it.
    pub padding: usize,
    /// Absolute column of the marker, zero based.
    pub marker_column: usize,
    /// Position where the item's content starts.
    pub content_start: PositionMarker<'a>,
}

impl ListItemStart<'_> {
    /// Columns from the enclosing container's content to this item's content.
    pub fn content_offset(&self) -> usize {
        self.ws_before_marker + self.padding
    }

    /// Absolute column where the item's content starts. For an empty item
    /// this is one column past the marker, even when the line ends there.
    pub fn indent_level(&self) -> usize {
        self.marker_column + self.padding
    }
}

/// Check whether two markers belong to the same list.
pub(crate) fn markers_match(data: &ListStackData, ordered: bool, marker: &ListMarker) -> bool {
    ordered == marker.is_ordered() && data.is_same_list(marker.list_character())
}

/// Try to parse a list marker at `pos`.
///
/// When the line would otherwise continue a paragraph, the item must have
/// content and an ordered item must start at 1.
pub(crate) fn try_parse_list_marker<'a>(
    pos: &PositionMarker<'a>,
    interrupts_paragraph: bool,
) -> Option<ListItemStart<'a>> {
    if pos.indent() > 3 {
        return None;
    }
    let (index, marker_column) = pos.first_nonspace();
    let content = &pos.text_to_parse[index..];
    let first = content.chars().next()?;

    let marker = if matches!(first, '-' | '+' | '*') {
        ListMarker::Bullet(first)
    } else {
        let digits = content.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 || digits > MAX_ORDERED_DIGITS {
            return None;
        }
        let delimiter = content[digits..].chars().next()?;
        if delimiter != '.' && delimiter != ')' {
            return None;
        }
        ListMarker::Ordered {
            number: content[..digits].to_string(),
            delimiter,
        }
    };

    let after_marker = pos.advance_to(index + marker.width());
    if !matches!(after_marker.rest().chars().next(), None | Some(' ' | '\t')) {
        return None;
    }

    let empty_item = after_marker.is_blank();
    if interrupts_paragraph {
        if empty_item {
            return None;
        }
        if let ListMarker::Ordered { number, .. } = &marker
            && number.parse::<u64>() != Ok(1)
        {
            return None;
        }
    }

    // Five or more columns after the marker make the first line an indented
    // code block; only one column belongs to the marker then.
    let spaces = after_marker.indent();
    let (padding, content_start) = if spaces >= 5 || spaces == 0 || empty_item {
        let start = if spaces > 0 {
            after_marker.advance_columns(1)
        } else {
            after_marker
        };
        (marker.width() + 1, start)
    } else {
        (marker.width() + spaces, after_marker.advance_columns(spaces))
    };

    Some(ListItemStart {
        ws_before_marker: marker_column - pos.index_indent,
        padding,
        marker_column,
        content_start,
        marker,
    })
}

/// How an open list item relates to the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListContinuation<'a> {
    /// The line belongs to the item; content continues at the position.
    Matched(PositionMarker<'a>),
    /// A blank line after an item that never had content: the item matches
    /// this line but cannot take any more content.
    ClosesEmptyItem(PositionMarker<'a>),
    Unmatched,
}

/// Decide whether the current line continues the open item of `data`.
pub(crate) fn match_list_continuation<'a>(
    data: &ListStackData,
    pos: &PositionMarker<'a>,
) -> ListContinuation<'a> {
    let blank = pos.is_blank();
    if data.item_closed {
        return if blank {
            ListContinuation::Matched(pos.skip_whitespace())
        } else {
            ListContinuation::Unmatched
        };
    }
    if pos.indent() >= data.content_offset {
        ListContinuation::Matched(pos.advance_columns(data.content_offset))
    } else if blank && data.item_has_content {
        ListContinuation::Matched(pos.skip_whitespace())
    } else if blank {
        ListContinuation::ClosesEmptyItem(pos.skip_whitespace())
    } else {
        ListContinuation::Unmatched
    }
}

fn stack_data(item: &ListItemStart<'_>, token: ListStackData) -> ListStackData {
    ListStackData {
        indent_level: item.indent_level(),
        content_offset: item.content_offset(),
        list_character: item.marker.list_character(),
        ws_before_marker: item.ws_before_marker,
        marker_width: item.marker.width(),
        ws_after_marker: item.padding - item.marker.width(),
        item_has_content: false,
        item_closed: false,
        ..token
    }
}

/// Open a new list whose first item starts at `item`.
pub(crate) fn open_list(
    state: &mut ParserState,
    start: &PositionMarker<'_>,
    item: &ListItemStart<'_>,
) -> Result<()> {
    let line_number = start.line_number;
    let (marker_index, _) = start.first_nonspace();
    let extracted_whitespace = start.text_to_parse[start.index_number..marker_index].to_string();
    let indent_level = item.indent_level();
    log::debug!(
        "line {line_number}: open {} list '{}' indent {indent_level}",
        if item.marker.is_ordered() { "ordered" } else { "unordered" },
        item.marker.list_character()
    );

    let kind = match &item.marker {
        ListMarker::Bullet(list_character) => TokenKind::UnorderedListStart {
            list_character: *list_character,
            indent_level,
            extracted_whitespace,
            leading_spaces: LeadingSpaces::default(),
        },
        ListMarker::Ordered { number, delimiter } => TokenKind::OrderedListStart {
            delimiter: *delimiter,
            start_number: number.clone(),
            indent_level,
            extracted_whitespace,
            leading_spaces: LeadingSpaces::default(),
        },
    };
    let token = state.push_token(MarkdownToken::new(kind, line_number, item.marker_column + 1));
    let data = stack_data(
        item,
        ListStackData {
            token,
            last_new_item: None,
            indent_level: 0,
            content_offset: 0,
            list_character: ' ',
            ws_before_marker: 0,
            marker_width: 0,
            ws_after_marker: 0,
            item_has_content: false,
            item_closed: false,
        },
    );
    state.stack.push(if item.marker.is_ordered() {
        StackToken::OrderedList(data)
    } else {
        StackToken::UnorderedList(data)
    });

    let consumed = item.content_start.consumed_since(start);
    state.record_leading_spaces(token, consumed.detabified, consumed.literal, line_number)
}

/// Start a sibling item in the list at `stack_index`.
pub(crate) fn new_list_item(
    state: &mut ParserState,
    stack_index: usize,
    start: &PositionMarker<'_>,
    item: &ListItemStart<'_>,
) -> Result<()> {
    let line_number = start.line_number;
    let (marker_index, _) = start.first_nonspace();
    let indent_level = item.indent_level();
    let list_start_content = match &item.marker {
        ListMarker::Ordered { number, .. } => number.clone(),
        ListMarker::Bullet(_) => String::new(),
    };
    log::debug!("line {line_number}: new list item, indent {indent_level}");

    let item_token = state.push_token(MarkdownToken::new(
        TokenKind::NewListItem {
            indent_level,
            extracted_whitespace: start.text_to_parse[start.index_number..marker_index].to_string(),
            list_start_content,
        },
        line_number,
        item.marker_column + 1,
    ));

    let Some(data) = state.stack.get_mut(stack_index).and_then(StackToken::list_data_mut) else {
        return Err(state.invariant(line_number, format!("stack entry {stack_index} is not a list")));
    };
    let list_token = data.token;
    *data = stack_data(
        item,
        ListStackData {
            last_new_item: Some(item_token),
            ..data.clone()
        },
    );

    let consumed = item.content_start.consumed_since(start);
    state.record_leading_spaces(list_token, consumed.detabified, consumed.literal, line_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(line: &str) -> Option<ListItemStart<'_>> {
        try_parse_list_marker(&PositionMarker::new(1, line), false)
    }

    #[test]
    fn bullet_markers() {
        for line in ["- a", "+ a", "* a"] {
            let item = marker(line).unwrap();
            assert_eq!(item.padding, 2);
            assert_eq!(item.content_start.rest(), "a");
        }
        assert!(marker("-a").is_none());
        assert_eq!(marker("-").unwrap().padding, 2);
    }

    #[test]
    fn ordered_markers() {
        let item = marker("10) foo").unwrap();
        assert_eq!(
            item.marker,
            ListMarker::Ordered {
                number: "10".to_string(),
                delimiter: ')'
            }
        );
        assert_eq!(item.padding, 4);
        assert!(marker("1234567890. x").is_none());
        assert!(marker("1: x").is_none());
    }

    #[test]
    fn wide_gap_after_marker_is_content() {
        let item = marker("-      code").unwrap();
        assert_eq!(item.padding, 2);
        assert_eq!(item.content_start.indent(), 5);
    }

    #[test]
    fn indentation_is_part_of_the_offset() {
        let item = marker("  1.  x").unwrap();
        assert_eq!(item.ws_before_marker, 2);
        assert_eq!(item.padding, 4);
        assert_eq!(item.content_offset(), 6);
        assert_eq!(item.marker_column, 2);
        assert!(marker("    - x").is_none());
    }

    #[test]
    fn empty_item_content_is_one_column_past_the_marker() {
        let item = marker(" -").unwrap();
        assert_eq!(item.content_start.index_indent, 2);
        assert_eq!(item.indent_level(), 3);
        assert_eq!(item.content_offset(), 3);
        assert_eq!(marker("10.").unwrap().indent_level(), 4);
    }

    #[test]
    fn paragraph_interruption_rules() {
        let pos = PositionMarker::new(1, "2. x");
        assert!(try_parse_list_marker(&pos, true).is_none());
        assert!(try_parse_list_marker(&PositionMarker::new(1, "1. x"), true).is_some());
        assert!(try_parse_list_marker(&PositionMarker::new(1, "-"), true).is_none());
        assert!(try_parse_list_marker(&PositionMarker::new(1, "- x"), true).is_some());
    }

    fn open_data(content_offset: usize) -> ListStackData {
        ListStackData {
            token: crate::tokens::TokenId(0),
            last_new_item: None,
            indent_level: content_offset,
            content_offset,
            list_character: '-',
            ws_before_marker: 0,
            marker_width: 1,
            ws_after_marker: 1,
            item_has_content: true,
            item_closed: false,
        }
    }

    #[test]
    fn continuation_needs_content_indent() {
        let data = open_data(2);
        let pos = PositionMarker::new(2, "  foo");
        assert!(matches!(
            match_list_continuation(&data, &pos),
            ListContinuation::Matched(after) if after.rest() == "foo"
        ));
        assert_eq!(
            match_list_continuation(&data, &PositionMarker::new(2, " foo")),
            ListContinuation::Unmatched
        );
        assert!(matches!(
            match_list_continuation(&data, &PositionMarker::new(2, "")),
            ListContinuation::Matched(_)
        ));
    }

    #[test]
    fn blank_line_closes_empty_item() {
        let mut data = open_data(2);
        data.item_has_content = false;
        assert!(matches!(
            match_list_continuation(&data, &PositionMarker::new(2, "")),
            ListContinuation::ClosesEmptyItem(_)
        ));
        data.item_closed = true;
        assert_eq!(
            match_list_continuation(&data, &PositionMarker::new(3, "  foo")),
            ListContinuation::Unmatched
        );
    }

    #[test]
    fn open_and_continue_list() {
        let mut state = ParserState::new();
        let start = PositionMarker::new(1, "- a");
        let item = try_parse_list_marker(&start, false).unwrap();
        open_list(&mut state, &start, &item).unwrap();
        assert_eq!(state.document[0].to_string(), "[ulist(1,1):-::2::- ]");

        let start = PositionMarker::new(2, "- b");
        let item = try_parse_list_marker(&start, false).unwrap();
        new_list_item(&mut state, 1, &start, &item).unwrap();
        assert_eq!(state.document[1].to_string(), "[li(2,1):2::]");
        assert_eq!(
            state.stack[1].list_data().and_then(|data| data.last_new_item),
            Some(crate::tokens::TokenId(1))
        );
        assert_eq!(state.document[0].to_string(), "[ulist(1,1):-::2::- \\n- ]");
    }
}
