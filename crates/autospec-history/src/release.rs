use autospec_spec::AutoreleaseFlags;

use crate::magic::MagicCommentResult;
use crate::snapshot::SpecSnapshot;

/// Release information computed for one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// `[epoch:]version` the count belongs to, `None` without a spec file.
    pub epoch_version: Option<String>,
    /// 0 when there is nothing to build.
    pub release_number: u32,
    /// The release as `%autorelease` expands it, without dist tag.
    pub release_complete: Option<String>,
}

/// Whether the release count of `child` depends on `parent`.
///
/// A parsed spec only continues the count of parents with the same
/// version, or of unparseable parents which may still turn out to share
/// it. An unparseable spec inherits from any parent with a spec.
pub(crate) fn needs_parent(child: &SpecSnapshot, parent: &SpecSnapshot) -> bool {
    match (child, parent) {
        (SpecSnapshot::Absent, _) | (_, SpecSnapshot::Absent) => false,
        (SpecSnapshot::Unparseable { .. }, _) => true,
        (SpecSnapshot::Parsed(_), SpecSnapshot::Unparseable { .. }) => true,
        (SpecSnapshot::Parsed(c), SpecSnapshot::Parsed(p)) => c.epoch_version == p.epoch_version,
    }
}

/// Compute the release of a commit from the results of the parents it needs.
pub(crate) fn visit<'a>(
    snapshot: &SpecSnapshot,
    magic: &MagicCommentResult,
    parents: impl IntoIterator<Item = &'a ReleaseInfo>,
) -> ReleaseInfo {
    match snapshot {
        SpecSnapshot::Absent => ReleaseInfo::default(),
        SpecSnapshot::Parsed(version) => {
            let previous = parents
                .into_iter()
                .filter(|p| p.epoch_version.as_deref() == Some(version.epoch_version.as_str()))
                .map(|p| p.release_number)
                .max()
                .unwrap_or(0);
            let number = previous.saturating_add(1).max(magic.bump_release);
            let flags = version.autorelease.clone().unwrap_or_default();
            ReleaseInfo {
                epoch_version: Some(version.epoch_version.clone()),
                release_number: number,
                release_complete: Some(flags.release_complete(number)),
            }
        }
        SpecSnapshot::Unparseable { .. } => {
            let highest = parents
                .into_iter()
                .max_by_key(|p| p.release_number);
            let (epoch_version, previous) = match highest {
                Some(p) => (p.epoch_version.clone(), p.release_number),
                None => (None, 0),
            };
            let number = previous.saturating_add(1).max(magic.bump_release);
            ReleaseInfo {
                epoch_version,
                release_number: number,
                release_complete: Some(AutoreleaseFlags::default().release_complete(number)),
            }
        }
    }
}
