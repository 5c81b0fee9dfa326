pub mod calculate_release;
pub mod convert;
pub mod generate_changelog;
pub mod process_distgit;

use anyhow::Result;
use clap::Subcommand;

use autospec_distgit::DistgitOptions;

use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the release of the package as %autorelease would expand it
    CalculateRelease(calculate_release::CalculateReleaseArgs),
    /// Print the changelog of the package
    GenerateChangelog(generate_changelog::GenerateChangelogArgs),
    /// Rewrite the spec file so it builds without autospec
    ProcessDistgit(process_distgit::ProcessDistgitArgs),
    /// Switch a spec file to %autorelease and %autochangelog
    Convert(convert::ConvertArgs),
}

/// Options for the dist-git operations from the global flags.
pub fn distgit_options(cli: &Cli) -> DistgitOptions {
    DistgitOptions {
        parser: cli.spec_parser.into(),
        include_uncommitted: !cli.ignore_uncommitted,
        strict: cli.strict,
        ..DistgitOptions::default()
    }
}

pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::CalculateRelease(args) => calculate_release::run(args, &cli),
        Commands::GenerateChangelog(args) => generate_changelog::run(args, &cli),
        Commands::ProcessDistgit(args) => process_distgit::run(args, &cli),
        Commands::Convert(args) => convert::run(args, &cli),
    }
}
