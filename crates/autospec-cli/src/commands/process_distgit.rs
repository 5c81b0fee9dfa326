use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::Cli;
use super::distgit_options;

#[derive(Args)]
pub struct ProcessDistgitArgs {
    /// Package directory or spec file
    path: PathBuf,

    /// Write the processed spec file here instead of in place
    target: Option<PathBuf>,
}

pub fn run(args: &ProcessDistgitArgs, cli: &Cli) -> Result<i32> {
    let processed = autospec_distgit::process_distgit(
        &args.path,
        args.target.as_deref(),
        &distgit_options(cli),
    )?;
    if !processed {
        tracing::info!("spec file uses neither %autorelease nor %autochangelog, left as is");
    }
    Ok(0)
}
