mod commands;
mod logging;

use std::process;

use anyhow::Result;
use clap::{error::ErrorKind, Parser, ValueEnum};

use autospec_distgit::{DistgitError, ParserKind};
use commands::Commands;

#[derive(Parser)]
#[command(
    name = "autospec",
    about = "Release numbers and changelogs for RPM packages from git history",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Ignore uncommitted changes in the package directory
    #[arg(long, global = true)]
    ignore_uncommitted: bool,

    /// How to query spec files
    #[arg(long, value_enum, default_value_t = SpecParserArg::Rpm, global = true)]
    spec_parser: SpecParserArg,

    /// Fail if the current spec file can't be parsed
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SpecParserArg {
    /// Run `rpm` (or $AUTOSPEC_RPM)
    Rpm,
    /// Built-in text parser, no `rpm` needed
    Builtin,
}

impl From<SpecParserArg> for ParserKind {
    fn from(arg: SpecParserArg) -> Self {
        match arg {
            SpecParserArg::Rpm => ParserKind::Rpm,
            SpecParserArg::Builtin => ParserKind::Builtin,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(128),
            }
        }
    };

    if let Err(e) = logging::init(cli.verbose, cli.quiet) {
        eprintln!("fatal: {e}");
        process::exit(128);
    }

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("fatal: {e}");
            let code = match e.downcast_ref::<DistgitError>() {
                Some(DistgitError::SpecParse { .. }) => 1,
                _ => 128,
            };
            process::exit(code);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    commands::run(cli)
}
