use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use gfmtok::{Config, TokenizerError};

mod cli;
use cli::{Cli, Commands};

/// Exit code for input that could not be read.
const EXIT_IO: u8 = 1;
/// Exit code for an internal tokenizer failure.
const EXIT_INTERNAL: u8 = 2;

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Tokenizer(TokenizerError),
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<TokenizerError> for CliError {
    fn from(err: TokenizerError) -> Self {
        CliError::Tokenizer(err)
    }
}

fn read_all(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn start_dir_for(input_path: &Option<PathBuf>) -> io::Result<PathBuf> {
    if let Some(p) = input_path {
        Ok(p.parent().unwrap_or(Path::new(".")).to_path_buf())
    } else {
        std::env::current_dir()
    }
}

fn load_config(explicit: Option<&Path>, file: &Option<PathBuf>) -> io::Result<Config> {
    let start_dir = start_dir_for(file)?;
    let (cfg, cfg_path) = gfmtok::config::load(explicit, &start_dir)?;

    if let Some(path) = &cfg_path {
        log::debug!("Using config from: {}", path.display());
    } else {
        log::debug!("Using default config");
    }
    Ok(cfg)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Parse { file, json } => {
            let cfg = load_config(cli.config.as_deref(), &file)?;
            let input = read_all(file.as_ref())?;
            let document = gfmtok::tokenize(&input, Some(&cfg))?;

            if json {
                let out = serde_json::to_string_pretty(&document).map_err(io::Error::other)?;
                println!("{out}");
            } else {
                print!("{}", gfmtok::dump_tokens(&document));
            }
            Ok(())
        }
        Commands::Render { file } => {
            let cfg = load_config(cli.config.as_deref(), &file)?;
            let input = read_all(file.as_ref())?;
            let html = gfmtok::render_html(&input, Some(&cfg))?;
            print!("{html}");
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Io(err)) => {
            eprintln!("Error: {err}");
            ExitCode::from(EXIT_IO)
        }
        Err(CliError::Tokenizer(err)) => {
            eprintln!("Internal error: {err}");
            ExitCode::from(EXIT_INTERNAL)
        }
    }
}
