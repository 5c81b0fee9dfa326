//! Foundation utilities shared by the autospec crates.
//!
//! Locale-independent changelog dates and commit signatures, a subprocess
//! builder used to drive `rpm`, atomic lock-file writes for rewriting spec
//! files, and pager support for the command line front end.

pub mod date;
pub mod error;
pub mod lockfile;
pub mod pager;
pub mod subprocess;

pub use date::{CommitDate, Signature};
pub use error::{LockError, UtilError};

pub type Result<T> = std::result::Result<T, UtilError>;
