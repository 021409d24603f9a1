use crate::block_parser::tests::helpers::{block_names, dump, parse_blocks, parse_with};
use crate::options::ParserOptions;

#[test]
fn simple_table() {
    let tokens = dump(&parse_blocks("| a | b |\n| --- | :-: |\n| c | d |\n").tokens);
    similar_asserts::assert_eq!(
        tokens,
        vec![
            "[table(1,1)]",
            "[table-header(1,1)]",
            "[table-header-item(1,3):]",
            "[text(1,3):a: ]",
            "[end-table-header-item:::false]",
            "[table-header-item(1,7):center]",
            "[text(1,7):b: ]",
            "[end-table-header-item:::false]",
            "[end-table-header::| --- | :-: |:false]",
            "[table-body(3,1)]",
            "[table-row(3,1)]",
            "[table-row-item(3,3):]",
            "[text(3,3):c: ]",
            "[end-table-row-item:::false]",
            "[table-row-item(3,7):center]",
            "[text(3,7):d: ]",
            "[end-table-row-item:::false]",
            "[end-table-row:::false]",
            "[end-table-body:::false]",
            "[end-table:::false]",
            "[BLANK(4,1):]",
        ]
    );
}

#[test]
fn header_only_table_has_no_body() {
    let names = block_names("a | b\n-- | --\n");
    assert_eq!(
        names,
        vec!["table", "table-header", "table-header-item", "table-header-item"]
    );
}

#[test]
fn mismatched_delimiter_falls_back_to_paragraph() {
    assert_eq!(block_names("| a | b |\n| --- |\n"), vec!["para"]);
}

#[test]
fn pipe_line_without_delimiter_is_a_paragraph() {
    assert_eq!(block_names("a | b\nplain\n"), vec!["para"]);
}

#[test]
fn table_ends_at_a_new_block() {
    assert_eq!(
        block_names("a | b\n--|--\nc | d\n# h\n"),
        vec![
            "table",
            "table-header",
            "table-header-item",
            "table-header-item",
            "table-body",
            "table-row",
            "table-row-item",
            "table-row-item",
            "atx",
        ]
    );
}

#[test]
fn table_inside_block_quote() {
    let names = block_names("> a | b\n> --|--\n");
    assert_eq!(names[..3], ["block-quote", "table", "table-header"]);
}

#[test]
fn tables_can_be_disabled() {
    let options = ParserOptions {
        tables: false,
        ..ParserOptions::default()
    };
    let document = parse_with("a | b\n--|--\n", &options);
    assert_eq!(document.tokens[0].to_string(), "[para(1,1):]");
}

#[test]
fn delimiter_row_takes_header_from_paragraph() {
    let tokens = dump(&parse_blocks("a\n| b |\n| - |\n").tokens);
    similar_asserts::assert_eq!(
        tokens,
        vec![
            "[para(1,1):]",
            "[text(1,1):a:]",
            "[end-para:::true]",
            "[table(2,1)]",
            "[table-header(2,1)]",
            "[table-header-item(2,3):]",
            "[text(2,3):b: ]",
            "[end-table-header-item:::false]",
            "[end-table-header::| - |:false]",
            "[end-table:::false]",
            "[BLANK(4,1):]",
        ]
    );
}

#[test]
fn table_from_paragraph_keeps_body_rows() {
    assert_eq!(
        block_names("a\nb\nc | d\n--|--\ne | f\n")[..4],
        ["para", "table", "table-header", "table-header-item"]
    );
    assert!(block_names("a\nc | d\n--|--\ne | f\n").contains(&"table-body"));
    assert_eq!(block_names("a\nc | d\n--|--|--\n"), vec!["para"]);
}

#[test]
fn lone_pipe_is_not_a_header() {
    assert_eq!(block_names("|\n|-\n"), vec!["para"]);
    assert_eq!(block_names("a\n|\n|-\n"), vec!["para"]);
}
