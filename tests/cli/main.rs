//! CLI integration tests for gfmtok.
//!
//! These tests execute the compiled binary and verify CLI behavior including:
//! - Subcommand behavior (parse, render)
//! - Stdin/stdout handling
//! - Config discovery
//! - Exit codes

mod common;
mod parse;
mod render;
