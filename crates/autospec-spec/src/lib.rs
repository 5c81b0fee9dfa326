//! RPM spec file handling.
//!
//! Detects the `%autorelease` and `%autochangelog` markers, queries spec
//! files for their version through a pluggable [`SpecParser`], and rewrites
//! spec files once release and changelog are known.

mod features;
mod parser;
mod rewrite;

pub use features::SpecFeatures;
pub use parser::{
    AutoreleaseFlags, BuiltinSpecParser, RpmSpecParser, SpecParseError, SpecParser, SpecVersion,
    RPM_ENV,
};
pub use rewrite::{
    autorelease_block, convert_text, splice_spec, strip_autorelease_block, ConvertOptions,
    Converted, AUTORELEASE_BLOCK_END, AUTORELEASE_BLOCK_START,
};

use std::path::PathBuf;

/// Errors produced by spec file operations.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("unable to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("spec file has no Release tag")]
    NoReleaseTag,

    #[error(transparent)]
    Parse(#[from] SpecParseError),
}
