use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use autospec_spec::ConvertOptions;

use crate::Cli;
use super::distgit_options;

#[derive(Args)]
pub struct ConvertArgs {
    /// Package directory or spec file
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Keep the literal Release: value
    #[arg(long)]
    no_release: bool,

    /// Keep the manual %changelog
    #[arg(long)]
    no_changelog: bool,
}

pub fn run(args: &ConvertArgs, cli: &Cli) -> Result<i32> {
    if args.no_release && args.no_changelog {
        eprintln!("error: nothing to do with both --no-release and --no-changelog");
        return Ok(1);
    }

    let what = ConvertOptions {
        release: !args.no_release,
        changelog: !args.no_changelog,
    };
    let outcome = autospec_distgit::convert(&args.path, what, &distgit_options(cli))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if outcome.release_converted {
        writeln!(out, "Converted to %autorelease")?;
    }
    if outcome.changelog_converted {
        writeln!(out, "Converted to %autochangelog")?;
    }
    if let Some(path) = &outcome.changelog_file {
        writeln!(out, "Moved old changelog entries to {}", path.display())?;
    }
    Ok(0)
}
