use crate::block_parser::tests::helpers::{
    assert_tokens, block_names, dump, first_text, parse_blocks,
};
use crate::tokens::TokenKind;

fn list_indents(input: &str) -> Vec<usize> {
    parse_blocks(input)
        .tokens
        .iter()
        .filter_map(|token| match token.kind {
            TokenKind::UnorderedListStart { indent_level, .. }
            | TokenKind::OrderedListStart { indent_level, .. } => Some(indent_level),
            _ => None,
        })
        .collect()
}

#[test]
fn nested_list() {
    let tokens = dump(&parse_blocks("- a\n  - b\n").tokens).join("\n");
    insta::assert_snapshot!(tokens, @r"
    [ulist(1,1):-::2::- \n  \n]
    [para(1,3):]
    [text(1,3):a:]
    [end-para:::true]
    [ulist(2,3):-::4::- \n]
    [para(2,5):]
    [text(2,5):b:]
    [end-para:::false]
    [BLANK(3,1):]
    [end-ulist:::true]
    [end-ulist:::true]
    ");
}

#[test]
fn marker_at_ancestor_indent_is_a_sibling_of_the_ancestor() {
    assert_tokens(
        "- a\n  - b\n    - c\n  - d\n",
        &[
            "[ulist(1,1):-::2::- \\n  \\n  \\n  \\n]",
            "[para(1,3):]",
            "[text(1,3):a:]",
            "[end-para:::true]",
            "[ulist(2,3):-::4::- \\n  \\n- \\n]",
            "[para(2,5):]",
            "[text(2,5):b:]",
            "[end-para:::true]",
            "[ulist(3,5):-::6::- ]",
            "[para(3,7):]",
            "[text(3,7):c:]",
            "[end-para:::true]",
            "[end-ulist:::true]",
            "[li(4,3):4::]",
            "[para(4,5):]",
            "[text(4,5):d:]",
            "[end-para:::false]",
            "[BLANK(5,1):]",
            "[end-ulist:::true]",
            "[end-ulist:::true]",
        ],
    );
}

#[test]
fn sibling_items_share_one_list() {
    assert_eq!(
        block_names("* one\n* two\n* three\n"),
        vec!["ulist", "para", "li", "para", "li", "para"]
    );
}

#[test]
fn changing_bullet_starts_a_new_list() {
    assert_eq!(
        block_names("- a\n+ b\n"),
        vec!["ulist", "para", "ulist", "para"]
    );
}

#[test]
fn ordered_list_keeps_start_number() {
    let document = parse_blocks("7) seven\n8) eight\n");
    let TokenKind::OrderedListStart {
        delimiter,
        start_number,
        indent_level,
        ..
    } = &document.tokens[0].kind
    else {
        panic!("expected an ordered list, got {}", document.tokens[0]);
    };
    assert_eq!((*delimiter, start_number.as_str(), *indent_level), (')', "7", 3));
    assert!(
        document
            .tokens
            .iter()
            .any(|token| token.to_string() == "[li(2,1):3::8]")
    );
}

#[test]
fn only_ordered_one_interrupts_a_paragraph() {
    assert_eq!(block_names("text\n2. no\n"), vec!["para"]);
    assert_eq!(block_names("text\n1. yes\n"), vec!["para", "olist", "para"]);
}

#[test]
fn empty_item_cannot_interrupt_a_paragraph() {
    assert_eq!(block_names("text\n-\n"), vec!["setext"]);
    assert_eq!(block_names("text\n*\n"), vec!["para"]);
}

#[test]
fn lazy_line_continues_item_paragraph() {
    let document = parse_blocks("- a\nb\n");
    let TokenKind::UnorderedListStart { leading_spaces, .. } = &document.tokens[0].kind else {
        panic!("expected a list, got {}", document.tokens[0]);
    };
    // The final blank line still belongs to the item.
    assert_eq!(leading_spaces.entries, vec!["- ", "", ""]);
    assert_eq!(block_names("- a\nb\n"), vec!["ulist", "para"]);
}

#[test]
fn blank_line_between_items_stays_in_list() {
    assert_eq!(
        block_names("- a\n\n- b\n"),
        vec!["ulist", "para", "li", "para"]
    );
}

#[test]
fn empty_item_followed_by_blank_line_ends_item() {
    assert_eq!(block_names("-\n\n  foo\n"), vec!["ulist", "para"]);
    let document = parse_blocks("-\n\n  foo\n");
    let end_of_list = document
        .tokens
        .iter()
        .position(|token| token.to_string() == "[end-ulist:::true]")
        .unwrap();
    let paragraph = document
        .tokens
        .iter()
        .position(|token| matches!(token.kind, TokenKind::Paragraph { .. }))
        .unwrap();
    assert!(end_of_list < paragraph);
}

#[test]
fn wide_padding_means_indented_code_in_item() {
    assert_eq!(list_indents("-     code\n"), vec![2]);
    assert_eq!(block_names("-     code\n"), vec!["ulist", "icode-block"]);
}

#[test]
fn tab_after_marker_counts_to_the_tab_stop() {
    assert_eq!(list_indents("-\t\tfoo\n"), vec![2]);
    assert_eq!(block_names("-\t\tfoo\n"), vec!["ulist", "icode-block"]);
    assert_eq!(first_text("-\t\tfoo\n").as_deref(), Some("  foo"));
}

#[test]
fn tab_in_continuation_indent_nests_lists() {
    let input = " - foo\n   - bar\n\t - baz\n";
    assert_eq!(list_indents(input), vec![3, 5, 7]);
    assert_eq!(
        block_names(input),
        vec!["ulist", "para", "ulist", "para", "ulist", "para"]
    );
}

#[test]
fn indent_levels_are_absolute_columns() {
    assert_eq!(list_indents("- a\n  - b\n"), vec![2, 4]);
    assert_eq!(list_indents(" 1. a\n"), vec![4]);
}

#[test]
fn empty_item_indent_matches_continuation_column() {
    assert_eq!(list_indents("-\n  foo\n"), vec![2]);
    assert_eq!(list_indents("10)\n    foo\n"), vec![4]);
    assert_eq!(block_names("-\n  foo\n"), vec!["ulist", "para"]);
    let tokens = dump(&parse_blocks("- a\n-\n").tokens);
    assert!(tokens.contains(&"[li(2,1):2::]".to_string()), "{tokens:#?}");
}
