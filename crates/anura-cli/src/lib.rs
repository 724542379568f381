//! Command-line access to Anura configuration documents.
//!
//! The binary (`anura-config`) is a thin wrapper around [`run`]; keeping the
//! command logic in the library lets integration tests drive it with a
//! parsed [`Cli`] and an in-memory output buffer.
//!
//! # Usage
//!
//! ```text
//! anura-config [OPTIONS] <COMMAND>
//!
//! Commands:
//!   get       Print the value (or section) at a path
//!   set       Assign a value and save
//!   unset     Remove a value or section and save
//!   keys      List value paths
//!   dump      Print the whole configuration
//!   defaults  Apply the defaults template and save
//!
//! Options:
//!   -f, --file <PATH>       Configuration document [env: ANURA_CONFIG] [default: config.yml]
//!       --defaults <PATH>   Defaults template [env: ANURA_DEFAULTS]
//!       --no-defaults       Do not overlay defaults
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anura_config::infrastructure::document::{self, overlay_defaults};
use anura_config::{DocumentFormat, FileConfig, FileStore, Lookup};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

/// Defaults template compiled into the binary.
pub const BUNDLED_DEFAULTS: &str = include_str!("../defaults/config.yml");

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Reads and edits Anura configuration documents.
#[derive(Debug, Parser)]
#[command(
    name = "anura-config",
    about = "Read and edit Anura configuration documents",
    version
)]
pub struct Cli {
    /// Configuration document.  `.toml` files are read as TOML, everything
    /// else as YAML.  Created empty when missing.
    #[arg(short, long, default_value = "config.yml", env = "ANURA_CONFIG")]
    pub file: PathBuf,

    /// Defaults template.  The bundled template is used when not given.
    #[arg(long, env = "ANURA_DEFAULTS")]
    pub defaults: Option<PathBuf>,

    /// Do not overlay any defaults onto the loaded document.
    #[arg(long)]
    pub no_defaults: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the value at a path.  Sections are printed in debug form.
    Get { path: String },

    /// Assign a value to a path and save the document.
    Set { path: String, value: String },

    /// Remove a value or a whole section and save the document.
    Unset { path: String },

    /// List the paths of all values.
    Keys {
        /// Include values of nested sections.
        #[arg(long)]
        deep: bool,

        /// List below this section instead of the root.
        #[arg(long)]
        section: Option<String>,
    },

    /// Print every value as a document.
    Dump {
        #[arg(long, value_enum, default_value_t = DumpFormat::Yaml)]
        format: DumpFormat,
    },

    /// Apply the defaults template and save the document.
    Defaults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    Yaml,
    Toml,
    Json,
}

// ── Command execution ─────────────────────────────────────────────────────────

/// Executes `cli`, writing command output to `out`.
///
/// # Errors
///
/// Returns an error if the document cannot be loaded or saved, a path is
/// malformed, or `get` finds nothing at the requested path.
pub fn run(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut config = FileConfig::open(&cli.file)
        .with_context(|| format!("failed to open {}", cli.file.display()))?;

    let wants_defaults = matches!(cli.command, Command::Defaults);
    let applied = if cli.no_defaults && !wants_defaults {
        0
    } else {
        apply_template(&mut config, cli.defaults.as_deref())
    };
    debug!("{applied} default value(s) overlaid");

    match cli.command {
        Command::Get { path } => match config.get(&path)? {
            Some(Lookup::Scalar(value)) => writeln!(out, "{value}")?,
            Some(Lookup::Section(id)) => match config.section(id) {
                Some(section) => writeln!(out, "{section}")?,
                None => bail!("section at '{path}' vanished"),
            },
            None => bail!("no value at '{path}'"),
        },
        Command::Set { path, value } => {
            config.set(&path, value)?;
            config.save()?;
        }
        Command::Unset { path } => {
            config.remove(&path)?;
            config.save()?;
        }
        Command::Keys { deep, section } => {
            let keys = match section {
                None => config.get_keys(deep),
                Some(path) => match config.get(&path)? {
                    Some(Lookup::Section(id)) => config.keys_at(id, deep)?,
                    Some(Lookup::Scalar(_)) => bail!("'{path}' is a value, not a section"),
                    None => bail!("no section at '{path}'"),
                },
            };
            for key in keys {
                writeln!(out, "{key}")?;
            }
        }
        Command::Dump { format } => {
            let map = config.get_map(true);
            let text = match format {
                DumpFormat::Yaml => document::render(&map, DocumentFormat::Yaml)?,
                DumpFormat::Toml => document::render(&map, DocumentFormat::Toml)?,
                DumpFormat::Json => serde_json::to_string_pretty(&map)? + "\n",
            };
            write!(out, "{text}")?;
        }
        Command::Defaults => {
            config.save()?;
            writeln!(out, "applied {applied} default value(s)")?;
        }
    }
    Ok(())
}

/// Overlays the template at `path`, or the bundled one, onto `config`.
///
/// Best effort: a missing, unreadable or malformed template only logs a
/// warning.
fn apply_template(config: &mut FileConfig, path: Option<&Path>) -> usize {
    match path {
        Some(path) => {
            config.load_defaults_from(&FileStore::new(path), DocumentFormat::from_path(path))
        }
        None => overlay_defaults(config.tree_mut(), BUNDLED_DEFAULTS, DocumentFormat::Yaml),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_config_yml() {
        let cli = Cli::parse_from(["anura-config", "get", "sql.port"]);
        assert_eq!(cli.file, PathBuf::from("config.yml"));
        assert!(cli.defaults.is_none());
        assert!(!cli.no_defaults);
    }

    #[test]
    fn test_cli_parses_keys_flags() {
        let cli = Cli::parse_from(["anura-config", "keys", "--deep", "--section", "sql"]);
        match cli.command {
            Command::Keys { deep, section } => {
                assert!(deep);
                assert_eq!(section.as_deref(), Some("sql"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_dump_format() {
        let cli = Cli::parse_from(["anura-config", "dump", "--format", "json"]);
        assert!(matches!(cli.command, Command::Dump { format: DumpFormat::Json }));
    }

    #[test]
    fn test_bundled_defaults_parse() {
        let flat = document::load(BUNDLED_DEFAULTS, DocumentFormat::Yaml).unwrap();
        assert_eq!(flat.get("sql.port").map(String::as_str), Some("3306"));
        assert_eq!(flat.get("discord.token").map(String::as_str), Some(""));
    }
}
