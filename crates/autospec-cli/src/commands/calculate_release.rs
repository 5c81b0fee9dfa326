use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::Cli;
use super::distgit_options;

#[derive(Args)]
pub struct CalculateReleaseArgs {
    /// Package directory or spec file
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Print only the release number, without %autorelease flags applied
    #[arg(short = 'n', long)]
    number: bool,
}

pub fn run(args: &CalculateReleaseArgs, cli: &Cli) -> Result<i32> {
    let release = autospec_distgit::calculate_release(&args.path, &distgit_options(cli))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.number {
        writeln!(out, "{}", release.number)?;
    } else {
        writeln!(out, "{}", release.complete)?;
    }
    Ok(0)
}
