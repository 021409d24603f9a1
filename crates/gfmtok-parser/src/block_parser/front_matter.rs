//! YAML-style front matter at the very start of a document.

use super::utils::{is_blank, split_trailing_whitespace};
use crate::parser_state::ParserState;
use crate::tokens::{MarkdownToken, TokenKind};

const START_BOUNDARY: &str = "---";
const END_BOUNDARIES: &[&str] = &["---", "..."];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FrontMatter {
    pub start_boundary: String,
    pub end_boundary: String,
    pub collected_lines: Vec<String>,
}

impl FrontMatter {
    /// Physical lines covered, boundaries included.
    pub fn line_count(&self) -> usize {
        self.collected_lines.len() + 2
    }
}

/// Try to parse front matter from the first lines of a document.
///
/// The opening `---` must be followed by a non-blank line, and the block
/// must be closed by `---` or `...`; otherwise there is no front matter.
pub(crate) fn try_parse_front_matter(lines: &[&str]) -> Option<FrontMatter> {
    let first = *lines.first()?;
    if split_trailing_whitespace(first).0 != START_BOUNDARY {
        return None;
    }
    if lines.get(1).is_none_or(|line| is_blank(line)) {
        return None;
    }

    let end = lines
        .iter()
        .skip(1)
        .position(|line| END_BOUNDARIES.contains(&split_trailing_whitespace(line).0))?
        + 1;

    log::debug!("front matter over lines 1..={}", end + 1);
    Some(FrontMatter {
        start_boundary: first.to_string(),
        end_boundary: lines[end].to_string(),
        collected_lines: lines[1..end].iter().map(|line| line.to_string()).collect(),
    })
}

pub(crate) fn emit_front_matter(state: &mut ParserState, front_matter: FrontMatter) {
    state.push_token(MarkdownToken::new(
        TokenKind::FrontMatter {
            start_boundary: front_matter.start_boundary,
            end_boundary: front_matter.end_boundary,
            collected_lines: front_matter.collected_lines,
        },
        1,
        1,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_front_matter() {
        let matter = try_parse_front_matter(&["---", "title: x", "tags: []", "...", "# h"]).unwrap();
        assert_eq!(matter.collected_lines, vec!["title: x", "tags: []"]);
        assert_eq!(matter.end_boundary, "...");
        assert_eq!(matter.line_count(), 4);
    }

    #[test]
    fn unclosed_or_empty_is_not_front_matter() {
        assert!(try_parse_front_matter(&["---", "title: x"]).is_none());
        assert!(try_parse_front_matter(&["---", "", "---"]).is_none());
        assert!(try_parse_front_matter(&["# h", "---"]).is_none());
        assert!(try_parse_front_matter(&[]).is_none());
    }
}
