//! `anura-config` entry point.
//!
//! # Environment variable overrides
//!
//! | Variable          | Default      | Description               |
//! |-------------------|--------------|---------------------------|
//! | `ANURA_CONFIG`    | `config.yml` | Configuration document    |
//! | `ANURA_DEFAULTS`  | (bundled)    | Defaults template         |
//! | `RUST_LOG`        | `info`       | Log filter                |

use std::io;

use anura_cli::{run, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so that `get` and `dump` output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}
