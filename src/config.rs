use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gfmtok_parser::ParserOptions;
use serde::Deserialize;

/// Optional Markdown extensions recognized by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Extensions {
    /// GFM pipe tables
    pub tables: bool,
    /// A `---` delimited metadata block on the first line
    pub front_matter: bool,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            tables: true,
            front_matter: false,
        }
    }
}

impl From<&Extensions> for ParserOptions {
    fn from(extensions: &Extensions) -> Self {
        ParserOptions {
            tables: extensions.tables,
            front_matter: extensions.front_matter,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extensions: Extensions,
}

impl Config {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions::from(&self.extensions)
    }
}

/// Builder for [`Config`], mostly useful in tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn tables(mut self, enabled: bool) -> Self {
        self.config.extensions.tables = enabled;
        self
    }

    pub fn front_matter(mut self, enabled: bool) -> Self {
        self.config.extensions.front_matter = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

const CANDIDATE_NAMES: &[&str] = &[".gfmtok.toml", "gfmtok.toml"];

fn parse_config_str(s: &str, path: &Path) -> io::Result<Config> {
    toml::from_str::<Config>(s).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid config {}: {e}", path.display()),
        )
    })
}

fn read_config(path: &Path) -> io::Result<Config> {
    log::debug!("Reading config from: {}", path.display());
    let s = fs::read_to_string(path)?;
    let config = parse_config_str(&s, path)?;
    log::info!("Loaded config from: {}", path.display());
    Ok(config)
}

fn find_in_tree(start_dir: &Path) -> Option<PathBuf> {
    start_dir.ancestors().find_map(|dir| {
        CANDIDATE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

fn xdg_config_path() -> Option<PathBuf> {
    let from_xdg = env::var_os("XDG_CONFIG_HOME")
        .map(|xdg| PathBuf::from(xdg).join("gfmtok").join("config.toml"));
    let from_home = env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("gfmtok")
            .join("config.toml")
    });
    [from_xdg, from_home]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.is_file())
}

/// Load configuration with precedence:
/// 1) explicit path (error if unreadable/invalid)
/// 2) walk up from start_dir: .gfmtok.toml, gfmtok.toml
/// 3) XDG: $XDG_CONFIG_HOME/gfmtok/config.toml or ~/.config/gfmtok/config.toml
/// 4) default config
///
/// Discovered files that fail to parse are skipped with a warning.
pub fn load(explicit: Option<&Path>, start_dir: &Path) -> io::Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let cfg = read_config(path)?;
        return Ok((cfg, Some(path.to_path_buf())));
    }

    for candidate in [find_in_tree(start_dir), xdg_config_path()]
        .into_iter()
        .flatten()
    {
        match read_config(&candidate) {
            Ok(cfg) => return Ok((cfg, Some(candidate))),
            Err(err) => log::warn!("Ignoring config {}: {err}", candidate.display()),
        }
    }

    log::debug!("No config file found, using defaults");
    Ok((Config::default(), None))
}
