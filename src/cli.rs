use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gfmtok")]
#[command(author, version)]
#[command(about = "A block tokenizer for GitHub Flavored Markdown")]
#[command(
    long_about = "gfmtok splits GitHub Flavored Markdown documents into container and leaf \
    block tokens. It prints the token stream for inspection, or renders the block structure \
    as HTML."
)]
#[command(after_help = "\
EXAMPLES:

    # Print the tokens of a file
    gfmtok parse README.md

    # Tokenize from stdin as JSON
    cat README.md | gfmtok parse --json

    # Render the block structure as HTML
    gfmtok render README.md

CONFIGURATION:

gfmtok looks for configuration files in this order:
  1. Explicit --config path
  2. gfmtok.toml or .gfmtok.toml in the input's directory and its parents
  3. ~/.config/gfmtok/config.toml (XDG)
  4. Built-in defaults

Example .gfmtok.toml:

    [extensions]
    tables = true
    front_matter = false")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true)]
    #[arg(help = "Path to configuration file")]
    #[arg(
        long_help = "Path to a custom configuration file. If not specified, gfmtok will \
        search for .gfmtok.toml or gfmtok.toml in the input's directory and its parents, \
        then fall back to ~/.config/gfmtok/config.toml."
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tokenize a document and print its block tokens
    #[command(
        long_about = "Tokenize a document and print one block token per line. Container \
        tokens show the prefix they consumed on every line; End tokens show whether the \
        block was closed by its own syntax or forced closed."
    )]
    #[command(after_help = "\
EXAMPLES:

    # Tokenize a file
    gfmtok parse document.md

    # Tokenize from stdin
    echo '> quote' | gfmtok parse

    # Tokens and link definitions as JSON
    gfmtok parse --json document.md")]
    Parse {
        /// Input file (stdin if not provided)
        #[arg(help = "Input file path")]
        file: Option<PathBuf>,

        /// Print the tokens and link definitions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the block structure of a document as HTML
    #[command(
        long_about = "Render the block structure of a document as GitHub Flavored Markdown \
        HTML. Inline content is not parsed; text is escaped and written as is."
    )]
    Render {
        /// Input file (stdin if not provided)
        #[arg(help = "Input file path")]
        file: Option<PathBuf>,
    },
}
