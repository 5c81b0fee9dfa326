use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use autospec_utils::pager::setup_pager;

use crate::Cli;
use super::distgit_options;

#[derive(Args)]
pub struct GenerateChangelogArgs {
    /// Package directory or spec file
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Never page the output
    #[arg(long)]
    no_pager: bool,
}

pub fn run(args: &GenerateChangelogArgs, cli: &Cli) -> Result<i32> {
    let changelog = autospec_distgit::generate_changelog(&args.path, &distgit_options(cli))?;

    let pager = if args.no_pager { None } else { setup_pager()? };
    match pager {
        Some(mut pager) => {
            // The user may quit the pager before reading everything.
            let _ = pager.write_all(changelog.as_bytes());
            pager.wait()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(changelog.as_bytes())?;
            out.flush()?;
        }
    }
    Ok(0)
}
