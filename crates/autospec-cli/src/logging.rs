use std::io;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable with a `tracing` filter directive, overriding `-v`/`-q`.
pub const LOG_ENV: &str = "AUTOSPEC_LOG";

const CRATES: &[&str] = &[
    "autospec",
    "autospec_utils",
    "autospec_spec",
    "autospec_changelog",
    "autospec_history",
    "autospec_git",
    "autospec_distgit",
];

/// Log to stderr, at warn level unless told otherwise.
pub fn init(verbose: u8, quiet: bool) -> Result<()> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(default_directives(verbose, quiet)),
    }
    .map_err(|e| anyhow!("invalid {LOG_ENV}: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbose > 1)
        .without_time()
        .try_init()
        .map_err(|e| anyhow!("unable to set up logging: {e}"))
}

fn default_directives(verbose: u8, quiet: bool) -> String {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
