//! Golden test cases for the gfmtok tokenizer and HTML renderer.
//!
//! Each test case is a directory under `tests/cases/` containing:
//! - `input.md` - Source document
//! - `expected.html` - Expected HTML rendering of the block structure
//! - `tokens.txt` - (Optional) Expected token dump, one token per line
//! - `gfmtok.toml` - (Optional) Config to enable or disable extensions
//!
//! Run with `UPDATE_EXPECTED=1 cargo test` to regenerate expected outputs.
//! Run with `UPDATE_TOKENS=1 cargo test` to regenerate token dumps.

use gfmtok::{Config, TokenKind, dump_tokens, tokenize, transform_to_gfm};
use std::{collections::BTreeSet, fs, path::Path};

/// Load config from test case directory if it exists.
fn load_test_config(dir: &Path) -> Option<Config> {
    let config_path = dir.join("gfmtok.toml");
    if config_path.exists() {
        let content = fs::read_to_string(config_path).ok()?;
        toml::from_str(&content).ok()
    } else {
        None
    }
}

/// Run a single golden test case.
fn run_golden_case(case_name: &str) {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("cases")
        .join(case_name);

    let update_expected = std::env::var_os("UPDATE_EXPECTED").is_some();
    let update_tokens = std::env::var_os("UPDATE_TOKENS").is_some();

    let input = fs::read_to_string(dir.join("input.md"))
        .unwrap_or_else(|_| panic!("No input.md found in {}", case_name));
    let expected_path = dir.join("expected.html");
    let tokens_path = dir.join("tokens.txt");

    let config = load_test_config(&dir);
    let document = tokenize(&input, config.as_ref())
        .unwrap_or_else(|err| panic!("tokenizing {} failed: {err}", case_name));

    // Every opened block is closed exactly once
    let closed: Vec<usize> = document
        .tokens
        .iter()
        .filter_map(|token| match token.kind {
            TokenKind::End { start, .. } => Some(start.0),
            _ => None,
        })
        .collect();
    let distinct: BTreeSet<usize> = closed.iter().copied().collect();
    assert_eq!(distinct.len(), closed.len(), "block closed twice in {}", case_name);

    if tokens_path.exists() || update_tokens {
        let dump = dump_tokens(&document);
        if update_tokens {
            fs::write(&tokens_path, &dump).unwrap();
        } else {
            let expected_tokens = fs::read_to_string(&tokens_path)
                .unwrap_or_else(|_| panic!("Failed to read tokens.txt in {}", case_name));
            similar_asserts::assert_eq!(expected_tokens, dump, "tokens mismatch: {}", case_name);
        }
    }

    let output = transform_to_gfm(&document.tokens);

    if update_expected {
        fs::write(&expected_path, &output).unwrap();
        return;
    }

    let expected = fs::read_to_string(&expected_path)
        .unwrap_or_else(|_| panic!("Failed to read expected.html in {}", case_name));
    similar_asserts::assert_eq!(expected, output, "case: {}", case_name);
}

/// Macro to generate individual test functions for each golden case.
///
/// Usage: `golden_test_cases!(case1, case2, case3);`
///
/// Each case becomes its own test function, so failures don't stop other
/// cases from running.
macro_rules! golden_test_cases {
    ($($case:ident),+ $(,)?) => {
        $(
            #[test]
            fn $case() {
                run_golden_case(stringify!($case));
            }
        )+
    };
}

// To add a new test case:
// 1. Create a new directory under tests/cases/
// 2. Add the directory name to this list
golden_test_cases!(
    block_quote_lazy,
    fenced_code,
    front_matter,
    html_comment_and_headings,
    link_reference_definitions,
    loose_ordered_list,
    nested_lists,
    table,
    tabs_in_containers,
    tight_list_empty_items,
    unclosed_fence_at_end,
);
