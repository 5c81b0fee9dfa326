//! RPM changelog entries.
//!
//! Turns commit messages into `%changelog` items, wraps them the way
//! packagers do by hand, renders entry headers with locale-independent
//! dates, and parses headers back.

mod entry;
mod header;
mod items;
mod wrap;

pub use entry::{escape_macros, render, ChangelogEntry, GeneratedEntry, ERROR_PREFIX};
pub use header::ChangelogHeader;
pub use items::commitlog_to_changelog_items;
pub use wrap::{wrap_item, LINEWRAP_WIDTH};

use autospec_utils::UtilError;

/// Errors produced while reading changelog text.
#[derive(Debug, thiserror::Error)]
pub enum ChangelogError {
    #[error("invalid changelog header: '{0}'")]
    InvalidHeader(String),

    #[error(transparent)]
    Date(#[from] UtilError),
}
